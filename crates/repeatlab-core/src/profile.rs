//! Repeat profiles: how often each distinct item occurs within one sample.
//!
//! Every distinct item's count lands in exactly one [`Multiplicity`] bucket.
//! The bucket totals give the [`RepeatProfile`] `(pairs, triplets, quad_plus)`
//! and the scalar [`TrialStatistics`] that the aggregator tracks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sampler::Sample;

/// Per-sample mapping from item to occurrence count.
///
/// Keys are exactly the distinct items observed, so no value is ever zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<usize, usize>,
}

impl FrequencyTable {
    pub fn from_sample(sample: &Sample) -> Self {
        let mut counts = HashMap::with_capacity(sample.len());
        for &item in sample.items() {
            *counts.entry(item).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, item: usize) -> usize {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    /// Number of distinct items observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts; equals the sample size.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&item, &count)| (item, count))
    }
}

/// Bucket for a single distinct item's occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Unique,
    Pair,
    Triplet,
    /// Four or more occurrences; carries the actual count.
    QuadPlus(usize),
}

impl Multiplicity {
    /// Bucket for an item seen `count` times. `None` for an unseen item.
    pub fn classify(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Unique),
            2 => Some(Self::Pair),
            3 => Some(Self::Triplet),
            n => Some(Self::QuadPlus(n)),
        }
    }

    /// Occurrences represented by this bucket entry.
    pub fn count(self) -> usize {
        match self {
            Self::Unique => 1,
            Self::Pair => 2,
            Self::Triplet => 3,
            Self::QuadPlus(n) => n,
        }
    }
}

/// `(pairs, triplets, quad_plus)` for one sample.
///
/// Ordering is lexicographic over the tuple, which the aggregator relies on to
/// break ranking ties.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RepeatProfile {
    pub pairs: usize,
    pub triplets: usize,
    pub quad_plus: usize,
}

impl RepeatProfile {
    pub const fn new(pairs: usize, triplets: usize, quad_plus: usize) -> Self {
        Self {
            pairs,
            triplets,
            quad_plus,
        }
    }

    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.pairs, self.triplets, self.quad_plus)
    }
}

impl std::fmt::Display for RepeatProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.pairs, self.triplets, self.quad_plus)
    }
}

/// Scalar statistics derived from one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialStatistics {
    pub uniques: usize,
    pub pairs: usize,
    pub triplets: usize,
    pub quad_plus: usize,
    /// Sum of the counts that fell in the four-or-more bucket.
    pub quad_plus_mass: usize,
    pub max_frequency: usize,
    pub distinct_types_seen: usize,
}

impl TrialStatistics {
    pub fn from_table(table: &FrequencyTable) -> Self {
        let mut stats = Self {
            distinct_types_seen: table.distinct(),
            ..Self::default()
        };
        for (_, count) in table.iter() {
            let Some(bucket) = Multiplicity::classify(count) else {
                continue;
            };
            match bucket {
                Multiplicity::Unique => stats.uniques += 1,
                Multiplicity::Pair => stats.pairs += 1,
                Multiplicity::Triplet => stats.triplets += 1,
                Multiplicity::QuadPlus(n) => {
                    stats.quad_plus += 1;
                    stats.quad_plus_mass += n;
                }
            }
            stats.max_frequency = stats.max_frequency.max(count);
        }
        stats
    }

    pub fn repeat_profile(&self) -> RepeatProfile {
        RepeatProfile::new(self.pairs, self.triplets, self.quad_plus)
    }

    /// Total occurrences accounted for by the buckets. Equals the sample size.
    pub fn accounted_items(&self) -> usize {
        self.uniques + 2 * self.pairs + 3 * self.triplets + self.quad_plus_mass
    }

    /// Exactly one item repeated twice, all others seen once.
    pub fn is_single_pair(&self, sample_size: usize) -> bool {
        self.repeat_profile() == RepeatProfile::new(1, 0, 0)
            && sample_size >= 2
            && self.uniques == sample_size - 2
    }
}

/// Everything the profiler derives from one sample.
#[derive(Debug, Clone)]
pub struct SampleProfile {
    pub table: FrequencyTable,
    pub repeat: RepeatProfile,
    pub stats: TrialStatistics,
}

/// Profile one sample. An empty sample yields all-zero statistics.
pub fn profile(sample: &Sample) -> SampleProfile {
    let table = FrequencyTable::from_sample(sample);
    let stats = TrialStatistics::from_table(&table);
    SampleProfile {
        repeat: stats.repeat_profile(),
        table,
        stats,
    }
}
