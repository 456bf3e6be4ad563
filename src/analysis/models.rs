//! Data types for groundwater sample analysis.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AnalysisError;

/// Field path (e.g. `metals.0.value`) to the messages raised against it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// One heavy-metal reading within a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metal {
    /// Identifier, unique within a sample
    pub id: String,
    /// Display name, e.g. "Arsenic (As)"
    pub name: String,
    /// Concentration in mg/L (>= 0)
    pub value: f64,
}

/// A validated groundwater sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub location_name: String,
    /// Latitude in degrees (-90..=90)
    pub latitude: f64,
    /// Longitude in degrees (-180..=180)
    pub longitude: f64,
    pub collection_date: NaiveDate,
    /// Never empty
    pub metals: Vec<Metal>,
}

impl Sample {
    /// Concentrations in submission order.
    pub fn concentrations(&self) -> Vec<f64> {
        self.metals.iter().map(|m| m.value).collect()
    }
}

/// Pollution indices, each rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indices {
    /// Heavy Metal Pollution Index
    pub hpi: f64,
    /// Metal Index
    pub mi: f64,
    /// Pollution Load Index
    pub pli: f64,
}

/// Generated summary plus the indices it was written for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: String,
    pub hpi: f64,
    pub mi: f64,
    pub pli: f64,
}

impl Report {
    pub fn new(summary: String, indices: Indices) -> Self {
        Self {
            summary,
            hpi: indices.hpi,
            mi: indices.mi,
            pli: indices.pli,
        }
    }
}

/// Sample echoed back in an outcome.
///
/// Invalid submissions have no validated form, so they are returned as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleData {
    Validated(Sample),
    Submitted(serde_json::Value),
}

/// Result of one analysis run. Exactly one of `report` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub report: Option<Report>,
    pub sample_data: SampleData,
    pub error: Option<String>,
    /// Field-level problems, only for invalid submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl AnalysisOutcome {
    pub fn done(sample: Sample, report: Report) -> Self {
        Self {
            report: Some(report),
            sample_data: SampleData::Validated(sample),
            error: None,
            field_errors: None,
        }
    }

    /// Terminal failure; `field_errors` is filled for invalid input only.
    pub fn rejected(sample_data: SampleData, error: AnalysisError) -> Self {
        let message = error.to_string();
        let field_errors = match error {
            AnalysisError::InvalidInput(errors) => Some(errors),
            AnalysisError::SummaryUnavailable(_) => None,
        };

        Self {
            report: None,
            sample_data,
            error: Some(message),
            field_errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.report.is_some()
    }
}

/// Default metal rows offered by the input form.
#[derive(Debug, Serialize)]
pub struct DefaultMetals {
    pub metals: Vec<Metal>,
}

impl Default for DefaultMetals {
    fn default() -> Self {
        let metals = [
            ("As", "Arsenic (As)"),
            ("Pb", "Lead (Pb)"),
            ("Cd", "Cadmium (Cd)"),
            ("Cr", "Chromium (Cr)"),
        ]
        .into_iter()
        .map(|(id, name)| Metal {
            id: id.to_string(),
            name: name.to_string(),
            value: 0.0,
        })
        .collect();

        Self { metals }
    }
}
