//! Baseline statistics and z-scores
//!
//! Mean and population standard deviation come from `statrs`. Degenerate
//! inputs (empty slices, zero spread, non-finite values) never produce NaN or
//! infinity at this boundary: they collapse to 0.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Distance of `value` from `mean` in standard deviations, unsigned.
///
/// Defined as 0 when `std_dev` is 0 (or not finite).
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }
    let z = ((value - mean) / std_dev).abs();
    if z.is_finite() {
        z
    } else {
        0.0
    }
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or_zero(values.iter().mean())
}

/// Mean and population standard deviation of a baseline window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    pub std_dev: f64,
}

impl Baseline {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            mean: finite_or_zero(values.iter().mean()),
            std_dev: finite_or_zero(values.iter().population_std_dev()),
        }
    }

    pub fn z_score(&self, value: f64) -> f64 {
        z_score(value, self.mean, self.std_dev)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
