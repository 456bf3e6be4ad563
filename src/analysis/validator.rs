//! Validation of raw sample submissions.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use super::models::{FieldErrors, Metal, Sample};

const LOCATION_REQUIRED: &str = "Location name is required.";
const LATITUDE_RANGE: &str = "Must be between -90 and 90";
const LONGITUDE_RANGE: &str = "Must be between -180 and 180";
const DATE_REQUIRED: &str = "A collection date is required.";
const DATE_INVALID: &str = "Invalid date";
const DATE_IN_FUTURE: &str = "Date must not be in the future";
const DATE_TOO_EARLY: &str = "Date must not be before 1900-01-01";
const METALS_REQUIRED: &str = "At least one metal concentration is required.";
const METAL_NAME_REQUIRED: &str = "Metal name is required.";
const METAL_ID_DUPLICATE: &str = "Duplicate metal id";
const NON_NEGATIVE: &str = "Must be non-negative";
const EXPECTED_NUMBER: &str = "Expected a number";
const EXPECTED_STRING: &str = "Expected a string";
const EXPECTED_OBJECT: &str = "Expected an object";
const EXPECTED_LIST: &str = "Expected a list of metals";

/// Validate a raw submission against today's UTC date.
pub fn validate(raw: &Value) -> Result<Sample, FieldErrors> {
    validate_on(raw, Utc::now().date_naive())
}

/// Validate a raw submission, collecting every field-level problem.
pub fn validate_on(raw: &Value, today: NaiveDate) -> Result<Sample, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(fields) = raw.as_object() else {
        push(&mut errors, "sample", EXPECTED_OBJECT);
        return Err(errors);
    };

    let location_name = match fields.get("locationName") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => {
            push(&mut errors, "locationName", LOCATION_REQUIRED);
            None
        }
    };

    let latitude = coordinate(fields, "latitude", 90.0, LATITUDE_RANGE, &mut errors);
    let longitude = coordinate(fields, "longitude", 180.0, LONGITUDE_RANGE, &mut errors);

    let collection_date = match fields.get("collectionDate") {
        None | Some(Value::Null) => {
            push(&mut errors, "collectionDate", DATE_REQUIRED);
            None
        }
        Some(Value::String(s)) => match parse_date(s) {
            Some(date) if date > today => {
                push(&mut errors, "collectionDate", DATE_IN_FUTURE);
                None
            }
            Some(date) if date < earliest_date() => {
                push(&mut errors, "collectionDate", DATE_TOO_EARLY);
                None
            }
            Some(date) => Some(date),
            None => {
                push(&mut errors, "collectionDate", DATE_INVALID);
                None
            }
        },
        Some(_) => {
            push(&mut errors, "collectionDate", DATE_INVALID);
            None
        }
    };

    let metals = metals(fields.get("metals"), &mut errors);

    match (location_name, latitude, longitude, collection_date, metals) {
        (Some(location_name), Some(latitude), Some(longitude), Some(collection_date), Some(metals))
            if errors.is_empty() =>
        {
            Ok(Sample {
                location_name,
                latitude,
                longitude,
                collection_date,
                metals,
            })
        }
        _ => Err(errors),
    }
}

fn push(errors: &mut FieldErrors, path: &str, message: &str) {
    errors
        .entry(path.to_string())
        .or_default()
        .push(message.to_string());
}

/// Coerce a JSON number or numeric string to a finite `f64`.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn coordinate(
    fields: &Map<String, Value>,
    key: &str,
    limit: f64,
    range_message: &str,
    errors: &mut FieldErrors,
) -> Option<f64> {
    match coerce_number(fields.get(key)) {
        Some(n) if (-limit..=limit).contains(&n) => Some(n),
        Some(_) => {
            push(errors, key, range_message);
            None
        }
        None => {
            push(errors, key, EXPECTED_NUMBER);
            None
        }
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC date).
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn metals(value: Option<&Value>, errors: &mut FieldErrors) -> Option<Vec<Metal>> {
    let entries = match value {
        None | Some(Value::Null) => {
            push(errors, "metals", METALS_REQUIRED);
            return None;
        }
        Some(Value::Array(entries)) if entries.is_empty() => {
            push(errors, "metals", METALS_REQUIRED);
            return None;
        }
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            push(errors, "metals", EXPECTED_LIST);
            return None;
        }
    };

    let mut seen_ids = HashSet::new();
    let mut metals = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Some(entry) = entry.as_object() else {
            push(errors, &format!("metals.{index}"), EXPECTED_OBJECT);
            continue;
        };

        let id = match entry.get("id") {
            Some(Value::String(id)) if !seen_ids.insert(id.clone()) => {
                push(errors, &format!("metals.{index}.id"), METAL_ID_DUPLICATE);
                None
            }
            Some(Value::String(id)) => Some(id.clone()),
            _ => {
                push(errors, &format!("metals.{index}.id"), EXPECTED_STRING);
                None
            }
        };

        let name = match entry.get("name") {
            Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
            _ => {
                push(errors, &format!("metals.{index}.name"), METAL_NAME_REQUIRED);
                None
            }
        };

        let value = match coerce_number(entry.get("value")) {
            Some(v) if v >= 0.0 => Some(v),
            Some(_) => {
                push(errors, &format!("metals.{index}.value"), NON_NEGATIVE);
                None
            }
            None => {
                push(errors, &format!("metals.{index}.value"), EXPECTED_NUMBER);
                None
            }
        };

        if let (Some(id), Some(name), Some(value)) = (id, name, value) {
            metals.push(Metal { id, name, value });
        }
    }

    (metals.len() == entries.len()).then_some(metals)
}
