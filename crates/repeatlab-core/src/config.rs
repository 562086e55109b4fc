//! Study configuration.
//!
//! Defaults reproduce the reference study: 1024 possible items, samples of
//! 100, one million trials.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters of the Monte Carlo repeat-profile study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub population_size: usize,
    pub sample_size: usize,
    pub num_trials: usize,
    /// Seed for the master RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// How many ranked repeat profiles to report.
    pub top_k: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            population_size: 1024,
            sample_size: 100,
            num_trials: 1_000_000,
            seed: None,
            top_k: 15,
        }
    }
}

impl StudyConfig {
    /// Reject parameters that cannot describe a study. Zero trials and zero
    /// sample size are degenerate but valid.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidParameter(
                "population_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a JSON config. Missing fields fall back to defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidParameter(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::InvalidParameter(format!("cannot parse config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Parameters of the sequence-frequency study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceStudyConfig {
    /// Alphabet symbols, e.g. `"HT"`.
    pub alphabet: String,
    pub length: usize,
    /// Symbol counted as a success for the per-sequence binomial comparison.
    pub success_symbol: char,
}

impl Default for SequenceStudyConfig {
    fn default() -> Self {
        Self {
            alphabet: "HT".to_string(),
            length: 10,
            success_symbol: 'H',
        }
    }
}

impl SequenceStudyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.alphabet.contains(self.success_symbol) {
            return Err(Error::InvalidParameter(format!(
                "success symbol {:?} is not in alphabet {:?}",
                self.success_symbol, self.alphabet
            )));
        }
        Ok(())
    }
}
