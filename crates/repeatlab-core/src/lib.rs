//! # repeatlab-core
//!
//! Draw finite samples with replacement from a population of `N` items, find
//! out which items repeat and how often, and aggregate those collision
//! profiles over many independent trials.
//!
//! ## Quick Start
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use repeatlab_core::{Aggregator, Statistic};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let result = Aggregator::new(365, 23, 2_000).unwrap().run(&mut rng);
//!
//! // Share of trials where nobody shared a birthday.
//! let no_pairs = result.proportion(Statistic::Pairs, 0);
//! assert!(no_pairs > 0.4 && no_pairs < 0.6);
//! ```
//!
//! ## Architecture
//!
//! Sampler → Profiler → Aggregator for the Monte Carlo study, and
//! SequenceCatalog → ObservedCounts for placing real sequences on a canonical
//! outcome space. Exact probabilities and divergences live in
//! `repeatlab-stats`.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod observed;
pub mod profile;
pub mod sampler;

pub use aggregate::{
    AggregateResult, Aggregator, DistributionRow, ProfileCount, Statistic, StudyParams,
    TRIALS_PER_CHUNK, TrialAccumulator, ValueCounts, expected_distinct,
};
pub use catalog::{LARGE_CATALOG_SIZE, MAX_CATALOG_SIZE, SequenceCatalog, SequenceIter};
pub use config::{SequenceStudyConfig, StudyConfig};
pub use error::{Error, Result};
pub use observed::{DuplicateSummary, ObservedCounts, SequenceCount};
pub use profile::{
    FrequencyTable, Multiplicity, RepeatProfile, SampleProfile, TrialStatistics, profile,
};
pub use sampler::{Sample, Sampler};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
