//! Exact multinomial point probability of a full count vector.

use log::warn;
use serde::{Deserialize, Serialize};
use statrs::function::factorial::ln_factorial;

use crate::divergence::{MASS_TOLERANCE, validate_probabilities};
use crate::error::{CompareError, Result};

/// Probability of one specific count vector, with its natural log.
///
/// The log stays accurate long after `probability` underflows to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultinomialProbability {
    pub probability: f64,
    pub ln_probability: f64,
}

impl MultinomialProbability {
    pub fn log10_probability(&self) -> f64 {
        self.ln_probability / std::f64::consts::LN_10
    }
}

/// `n! / Π c_i! · Π p_i^{c_i}` for `counts` over `p_categories`.
///
/// Refuses with [`CompareError::ConsistencyViolation`] when the counts do not
/// sum to `total_trials`.
pub fn multinomial_point_probability(
    counts: &[u64],
    total_trials: u64,
    p_categories: &[f64],
) -> Result<MultinomialProbability> {
    if counts.len() != p_categories.len() {
        return Err(CompareError::LengthMismatch {
            left: counts.len(),
            right: p_categories.len(),
        });
    }
    let mass = validate_probabilities(p_categories)?;
    let counted: u64 = counts.iter().sum();
    if counted != total_trials {
        return Err(CompareError::ConsistencyViolation {
            counted,
            declared: total_trials,
        });
    }
    if (mass - 1.0).abs() > MASS_TOLERANCE {
        warn!("multinomial category probabilities sum to {mass:.12}");
    }

    let mut ln_probability = ln_factorial(total_trials);
    for (&count, &p) in counts.iter().zip(p_categories) {
        if count == 0 {
            continue;
        }
        if p == 0.0 {
            return Ok(MultinomialProbability {
                probability: 0.0,
                ln_probability: f64::NEG_INFINITY,
            });
        }
        ln_probability += count as f64 * p.ln() - ln_factorial(count);
    }

    Ok(MultinomialProbability {
        probability: ln_probability.exp(),
        ln_probability,
    })
}

/// Multinomial result as carried in reports: either a number or the flagged
/// mismatch that prevented computing one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MultinomialOutcome {
    Probability {
        probability: f64,
        ln_probability: f64,
    },
    ConsistencyViolation {
        counted: u64,
        declared: u64,
    },
}

impl MultinomialOutcome {
    /// Run the computation and fold a consistency violation into the outcome.
    /// Other errors still propagate.
    pub fn evaluate(counts: &[u64], total_trials: u64, p_categories: &[f64]) -> Result<Self> {
        match multinomial_point_probability(counts, total_trials, p_categories) {
            Ok(m) => Ok(Self::Probability {
                probability: m.probability,
                ln_probability: m.ln_probability,
            }),
            Err(CompareError::ConsistencyViolation { counted, declared }) => {
                warn!("multinomial probability not computed: counts sum to {counted}, declared {declared}");
                Ok(Self::ConsistencyViolation { counted, declared })
            }
            Err(e) => Err(e),
        }
    }

    pub fn probability(&self) -> Option<f64> {
        match self {
            Self::Probability { probability, .. } => Some(*probability),
            Self::ConsistencyViolation { .. } => None,
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Self::ConsistencyViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_categories_matches_binomial() {
        // 10 fair flips, 3 heads: C(10,3)/1024
        let m = multinomial_point_probability(&[3, 7], 10, &[0.5, 0.5]).unwrap();
        assert!((m.probability - 120.0 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn three_categories() {
        // 2 trials, one each in categories 0 and 2: 2 * 0.2 * 0.5
        let m = multinomial_point_probability(&[1, 0, 1], 2, &[0.2, 0.3, 0.5]).unwrap();
        assert!((m.probability - 0.2).abs() < 1e-12);
        assert!((m.log10_probability() - 0.2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn zero_trials_is_certain() {
        let m = multinomial_point_probability(&[0, 0], 0, &[0.5, 0.5]).unwrap();
        assert_eq!(m.probability, 1.0);
    }

    #[test]
    fn impossible_category() {
        let m = multinomial_point_probability(&[1, 1], 2, &[1.0, 0.0]).unwrap();
        assert_eq!(m.probability, 0.0);
        assert_eq!(m.ln_probability, f64::NEG_INFINITY);
    }

    #[test]
    fn sum_mismatch_is_flagged() {
        let err = multinomial_point_probability(&[2, 1], 5, &[0.5, 0.5]).unwrap_err();
        assert_eq!(
            err,
            CompareError::ConsistencyViolation {
                counted: 3,
                declared: 5
            }
        );
        let outcome = MultinomialOutcome::evaluate(&[2, 1], 5, &[0.5, 0.5]).unwrap();
        assert!(outcome.is_violation());
        assert_eq!(outcome.probability(), None);
    }

    #[test]
    fn other_errors_propagate_through_outcome() {
        assert!(matches!(
            MultinomialOutcome::evaluate(&[1], 1, &[0.5, 0.5]),
            Err(CompareError::LengthMismatch { .. })
        ));
        assert!(matches!(
            MultinomialOutcome::evaluate(&[1, 0], 1, &[-0.5, 1.5]),
            Err(CompareError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn outcome_serializes_with_status() {
        let v = serde_json::to_value(MultinomialOutcome::ConsistencyViolation {
            counted: 3,
            declared: 5,
        })
        .unwrap();
        assert_eq!(v["status"], "consistency_violation");
        assert_eq!(v["declared"], 5);
    }
}
