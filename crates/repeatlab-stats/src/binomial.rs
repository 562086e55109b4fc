//! Exact binomial point probabilities and observed-vs-theoretical tables.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete};

use crate::divergence::{TotalVariation, total_variation_distance};
use crate::error::{CompareError, Result};

/// `P(K = k)` for `k = 0..=n_trials`, indexed by `k`.
pub fn binomial_point_probabilities(n_trials: u64, p_success: f64) -> Result<Vec<f64>> {
    let dist = Binomial::new(p_success, n_trials).map_err(|e| {
        CompareError::InvalidParameter(format!("binomial(n={n_trials}, p={p_success}): {e}"))
    })?;
    Ok((0..=n_trials).map(|k| dist.pmf(k)).collect())
}

/// One outcome class of a binomial comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinomialRow {
    pub k: u64,
    pub binomial_probability: f64,
    pub observed_frequency: u64,
    pub observed_probability: f64,
}

/// Observed success counts laid against `Binomial(n, p)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinomialComparison {
    pub n_trials: u64,
    pub p_success: f64,
    pub total_observations: u64,
    pub rows: Vec<BinomialRow>,
    pub total_variation: TotalVariation,
}

/// Compare a histogram of success counts (slot `k` = observations with `k`
/// successes, `n = observed.len() - 1`) against the binomial pmf.
///
/// With no observations the observed column is all zeros and the reported
/// empirical mass is 0.
pub fn binomial_comparison(observed: &[u64], p_success: f64) -> Result<BinomialComparison> {
    let Some(n_trials) = observed.len().checked_sub(1) else {
        return Err(CompareError::InvalidParameter(
            "observed histogram needs at least one outcome class".to_string(),
        ));
    };
    let n_trials = n_trials as u64;
    let theoretical = binomial_point_probabilities(n_trials, p_success)?;
    let total_observations: u64 = observed.iter().sum();

    let empirical: Vec<f64> = observed
        .iter()
        .map(|&count| {
            if total_observations == 0 {
                0.0
            } else {
                count as f64 / total_observations as f64
            }
        })
        .collect();

    let rows = theoretical
        .iter()
        .zip(observed.iter().zip(&empirical))
        .enumerate()
        .map(|(k, (&binomial_probability, (&observed_frequency, &observed_probability)))| {
            BinomialRow {
                k: k as u64,
                binomial_probability,
                observed_frequency,
                observed_probability,
            }
        })
        .collect();

    Ok(BinomialComparison {
        n_trials,
        p_success,
        total_observations,
        rows,
        total_variation: total_variation_distance(&theoretical, &empirical)?,
    })
}
