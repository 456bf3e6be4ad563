//! Pollution index calculation.
//!
//! HPI and PLI here are simplified weightings, not a regulatory standard.

use rust_decimal::{Decimal, RoundingStrategy};

use super::models::Indices;

/// Scale applied to the total concentration for HPI.
const HPI_SCALE: f64 = 10.5;

/// Round the exact stored value to two decimal places, ties away from zero.
///
/// Values outside the `Decimal` range are already whole numbers and pass through.
fn round2(value: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    exact
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .unwrap_or(value)
}

/// Compute HPI, MI and PLI over a non-empty list of concentrations.
///
/// Readings of zero are treated as 1 in the PLI product so a single missing
/// reading does not collapse the geometric mean to zero. An empty slice yields
/// all-zero indices; validated samples always carry at least one metal.
pub fn calculate(values: &[f64]) -> Indices {
    if values.is_empty() {
        return Indices { hpi: 0.0, mi: 0.0, pli: 0.0 };
    }

    let n = values.len() as f64;
    let total: f64 = values.iter().sum();
    let product: f64 = values
        .iter()
        .map(|&v| if v > 0.0 { v } else { 1.0 })
        .product();

    Indices {
        hpi: round2(total * HPI_SCALE),
        mi: round2(total / n),
        pli: round2(product.powf(1.0 / n)),
    }
}
