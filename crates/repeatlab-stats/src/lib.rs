//! Exact discrete probabilities and divergences for repeatlab studies.
//!
//! Provides binomial point probabilities, the multinomial point probability
//! of a whole count vector, Total Variation Distance between aligned
//! probability vectors, and closed-form collision probabilities. Inputs are
//! validated at each entry point and never silently renormalized.

pub mod binomial;
pub mod collision;
pub mod divergence;
pub mod error;
pub mod multinomial;
pub mod report;

pub use binomial::{
    BinomialComparison, BinomialRow, binomial_comparison, binomial_point_probabilities,
};
pub use collision::{prob_all_distinct, prob_any_collision, prob_exactly_one_pair};
pub use divergence::{
    MASS_TOLERANCE, TotalVariation, total_variation_distance, validate_probabilities,
};
pub use error::{CompareError, Result};
pub use multinomial::{MultinomialOutcome, MultinomialProbability, multinomial_point_probability};
pub use report::{DivergenceReport, SequenceStudyReport, analyze_sequences};
