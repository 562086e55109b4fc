//! Divergence and sequence-study reports.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use repeatlab_core::{DuplicateSummary, Error as CoreError, ObservedCounts, SequenceCatalog};

use crate::binomial::{BinomialComparison, binomial_comparison};
use crate::divergence::{TotalVariation, total_variation_distance};
use crate::error::{CompareError, Result};
use crate::multinomial::MultinomialOutcome;

/// Empirical vs theoretical distribution over one aligned outcome space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub theoretical: Vec<f64>,
    pub empirical: Vec<f64>,
    pub total_variation: TotalVariation,
    pub multinomial: MultinomialOutcome,
}

impl DivergenceReport {
    /// Compare observed counts against `theoretical` category probabilities.
    ///
    /// The empirical vector is the counts over their own sum. The multinomial
    /// step checks that sum against `declared_total` and flags any mismatch.
    pub fn new(theoretical: Vec<f64>, counts: &[u64], declared_total: u64) -> Result<Self> {
        let counted: u64 = counts.iter().sum();
        let empirical: Vec<f64> = counts
            .iter()
            .map(|&c| {
                if counted == 0 {
                    0.0
                } else {
                    c as f64 / counted as f64
                }
            })
            .collect();
        let total_variation = total_variation_distance(&theoretical, &empirical)?;
        let multinomial = MultinomialOutcome::evaluate(counts, declared_total, &theoretical)?;
        Ok(Self {
            theoretical,
            empirical,
            total_variation,
            multinomial,
        })
    }

    /// Every catalog sequence equally likely.
    pub fn uniform(catalog: &SequenceCatalog, observed: &ObservedCounts) -> Result<Self> {
        if observed.counts().len() != catalog.len() {
            return Err(CompareError::LengthMismatch {
                left: catalog.len(),
                right: observed.counts().len(),
            });
        }
        let theoretical = vec![catalog.probability_of_any_specific_sequence(); catalog.len()];
        Self::new(theoretical, observed.counts(), observed.declared_total())
    }

    pub fn outcome_count(&self) -> usize {
        self.theoretical.len()
    }
}

/// Full analysis of a batch of observed fixed-length sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStudyReport {
    pub alphabet: String,
    pub length: usize,
    pub success_symbol: char,
    pub observations: u64,
    pub declared_observations: u64,
    /// No sequence was counted. The divergence and multinomial figures then
    /// describe an empty vector and carry no evidence either way.
    pub empty_batch: bool,
    /// Distribution of success-symbol counts per sequence vs the binomial.
    pub symbol_counts: BinomialComparison,
    pub duplicates: DuplicateSummary,
    /// Whole-sequence frequencies vs the uniform model.
    pub divergence: DivergenceReport,
}

/// Analyze observed sequences under independent uniform symbols.
pub fn analyze_sequences(
    catalog: &SequenceCatalog,
    observed: &ObservedCounts,
    success_symbol: char,
) -> Result<SequenceStudyReport> {
    if !catalog.alphabet().contains(&success_symbol) {
        return Err(CoreError::InvalidParameter(format!(
            "success symbol {success_symbol:?} is not in the alphabet"
        ))
        .into());
    }
    let p_success = 1.0 / catalog.alphabet().len() as f64;
    let histogram = observed.symbol_count_histogram(catalog, success_symbol);
    let symbol_counts = binomial_comparison(&histogram, p_success)?;
    let divergence = DivergenceReport::uniform(catalog, observed)?;
    let duplicates = observed.duplicates(catalog);
    let empty_batch = observed.total() == 0;
    if empty_batch {
        warn!("no sequences observed; divergence figures are degenerate");
    }

    info!(
        "{} sequences, {} distinct, {} repeated: TVD {:.4} (symbol counts TVD {:.4})",
        observed.total(),
        duplicates.distinct,
        duplicates.repeated.len(),
        divergence.total_variation.distance,
        symbol_counts.total_variation.distance
    );

    Ok(SequenceStudyReport {
        alphabet: catalog.alphabet().iter().collect(),
        length: catalog.length(),
        success_symbol,
        observations: observed.total(),
        declared_observations: observed.declared_total(),
        empty_batch,
        symbol_counts,
        duplicates,
        divergence,
    })
}
