//! Total Variation Distance between aligned probability vectors.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, Result};

/// Allowed deviation of a probability vector's mass from 1.
pub const MASS_TOLERANCE: f64 = 1e-9;

/// TVD together with the mass of each input, so callers can see when a
/// vector did not sum to 1. Inputs are never renormalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalVariation {
    pub distance: f64,
    pub theoretical_mass: f64,
    pub empirical_mass: f64,
}

impl TotalVariation {
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.theoretical_mass - 1.0).abs() <= tolerance
            && (self.empirical_mass - 1.0).abs() <= tolerance
    }
}

/// Check that every entry is finite and non-negative. Returns the total mass.
pub fn validate_probabilities(p: &[f64]) -> Result<f64> {
    for (index, &value) in p.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(CompareError::InvalidProbability { index, value });
        }
    }
    Ok(p.iter().sum())
}

/// `0.5 * Σ |p_theoretical[i] - p_empirical[i]|`.
pub fn total_variation_distance(
    p_theoretical: &[f64],
    p_empirical: &[f64],
) -> Result<TotalVariation> {
    if p_theoretical.len() != p_empirical.len() {
        return Err(CompareError::LengthMismatch {
            left: p_theoretical.len(),
            right: p_empirical.len(),
        });
    }
    let theoretical_mass = validate_probabilities(p_theoretical)?;
    let empirical_mass = validate_probabilities(p_empirical)?;

    let distance = 0.5
        * p_theoretical
            .iter()
            .zip(p_empirical)
            .map(|(a, b)| (a - b).abs())
            .sum::<f64>();

    let tv = TotalVariation {
        distance,
        theoretical_mass,
        empirical_mass,
    };
    if !tv.is_normalized(MASS_TOLERANCE) {
        warn!(
            "TVD inputs are not probability vectors: theoretical mass {theoretical_mass:.12}, empirical mass {empirical_mass:.12}"
        );
    }
    Ok(tv)
}
