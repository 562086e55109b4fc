//! Observed sequence counts aligned to a [`SequenceCatalog`].

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::catalog::SequenceCatalog;
use crate::error::{Error, Result};

/// Slot `i` holds how many times the catalog's `i`-th sequence was observed.
///
/// `declared_total` is the number of observations the producer claims to have
/// made. It normally equals the sum of `counts`; when it does not, the
/// mismatch is kept so downstream exact probabilities can refuse to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedCounts {
    counts: Vec<u64>,
    declared_total: u64,
}

/// A sequence together with its multiplicity in the observed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCount {
    pub index: usize,
    pub sequence: String,
    pub count: u64,
}

/// Sequences seen more than once, plus how many were seen exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateSummary {
    /// Sorted by count descending, then canonical index.
    pub repeated: Vec<SequenceCount>,
    pub singletons: usize,
    pub distinct: usize,
}

impl ObservedCounts {
    /// Count a raw batch of sequences. Any sequence outside the catalog fails
    /// the whole batch.
    pub fn from_batch<I, S>(catalog: &SequenceCatalog, batch: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = vec![0u64; catalog.len()];
        let mut total = 0u64;
        for sequence in batch {
            counts[catalog.index_of(sequence.as_ref())?] += 1;
            total += 1;
        }
        Ok(Self {
            counts,
            declared_total: total,
        })
    }

    /// Build from `(sequence, multiplicity)` records, one per observed
    /// sequence. Identical repeated records collapse into one; the same
    /// sequence with two different multiplicities is rejected.
    ///
    /// A sum that differs from `declared_total` is not an error here; see
    /// [`is_consistent`](Self::is_consistent).
    pub fn from_multiplicities<S: AsRef<str>>(
        catalog: &SequenceCatalog,
        records: &[(S, u64)],
        declared_total: u64,
    ) -> Result<Self> {
        let mut by_index: HashMap<usize, u64> = HashMap::with_capacity(records.len());
        for (sequence, multiplicity) in records {
            let sequence = sequence.as_ref();
            let index = catalog.index_of(sequence)?;
            match by_index.insert(index, *multiplicity) {
                Some(previous) if previous != *multiplicity => {
                    return Err(Error::InvalidSequence {
                        sequence: sequence.to_string(),
                        reason: format!(
                            "conflicting multiplicities {previous} and {multiplicity}"
                        ),
                    });
                }
                _ => {}
            }
        }

        let mut counts = vec![0u64; catalog.len()];
        for (index, multiplicity) in by_index {
            counts[index] = multiplicity;
        }
        let observed = Self {
            counts,
            declared_total,
        };
        if !observed.is_consistent() {
            warn!(
                "observed counts sum to {} but {} observations were declared",
                observed.total(),
                declared_total
            );
        }
        Ok(observed)
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Sum of all slots.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn declared_total(&self) -> u64 {
        self.declared_total
    }

    pub fn is_consistent(&self) -> bool {
        self.total() == self.declared_total
    }

    /// Slot proportions relative to the summed total. All zeros when nothing
    /// was observed.
    pub fn empirical_probabilities(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }

    pub fn duplicates(&self, catalog: &SequenceCatalog) -> DuplicateSummary {
        let mut repeated: Vec<SequenceCount> = self
            .counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 1)
            .filter_map(|(index, &count)| {
                catalog.get(index).map(|s| SequenceCount {
                    index,
                    sequence: s.to_string(),
                    count,
                })
            })
            .collect();
        repeated.sort_by(|a, b| b.count.cmp(&a.count).then(a.index.cmp(&b.index)));

        DuplicateSummary {
            singletons: self.counts.iter().filter(|&&c| c == 1).count(),
            distinct: self.counts.iter().filter(|&&c| c > 0).count(),
            repeated,
        }
    }

    /// Observations bucketed by how many times `symbol` occurs in the
    /// sequence: slot `k` covers sequences with exactly `k` occurrences.
    pub fn symbol_count_histogram(&self, catalog: &SequenceCatalog, symbol: char) -> Vec<u64> {
        let mut histogram = vec![0u64; catalog.length() + 1];
        for (index, &count) in self.counts.iter().enumerate() {
            if count > 0 {
                histogram[catalog.symbol_count(index, symbol)] += count;
            }
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SequenceCatalog {
        SequenceCatalog::new("HT", 4).unwrap()
    }

    #[test]
    fn batch_counts() {
        let c = catalog();
        let obs = ObservedCounts::from_batch(&c, ["HHHH", "HTHT", "HHHH", "TTTT"]).unwrap();
        assert_eq!(obs.total(), 4);
        assert!(obs.is_consistent());
        assert_eq!(obs.counts()[0], 2);
        assert_eq!(obs.counts()[c.index_of("HTHT").unwrap()], 1);
        assert_eq!(obs.counts().len(), 16);
    }

    #[test]
    fn batch_rejects_invalid() {
        let c = catalog();
        assert!(ObservedCounts::from_batch(&c, ["HHHH", "HHH"]).is_err());
    }

    #[test]
    fn empty_batch() {
        let c = catalog();
        let obs = ObservedCounts::from_batch(&c, Vec::<String>::new()).unwrap();
        assert_eq!(obs.total(), 0);
        assert!(obs.is_consistent());
        assert!(obs.empirical_probabilities().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn multiplicities_collapse_identical_records() {
        let c = catalog();
        let records = [("HHHH", 2), ("HHHH", 2), ("TTTT", 1)];
        let obs = ObservedCounts::from_multiplicities(&c, &records, 3).unwrap();
        assert_eq!(obs.total(), 3);
        assert!(obs.is_consistent());
    }

    #[test]
    fn multiplicities_conflict() {
        let c = catalog();
        let records = [("HHHH", 2), ("HHHH", 3)];
        assert!(matches!(
            ObservedCounts::from_multiplicities(&c, &records, 5),
            Err(Error::InvalidSequence { .. })
        ));
    }

    #[test]
    fn multiplicities_mismatch_is_kept() {
        let c = catalog();
        let records = [("HHHH", 2), ("TTTT", 1)];
        let obs = ObservedCounts::from_multiplicities(&c, &records, 10).unwrap();
        assert_eq!(obs.total(), 3);
        assert_eq!(obs.declared_total(), 10);
        assert!(!obs.is_consistent());
    }

    #[test]
    fn duplicate_summary() {
        let c = catalog();
        let obs =
            ObservedCounts::from_batch(&c, ["TTTT", "HTHT", "TTTT", "HTHT", "TTTT", "HHHH"])
                .unwrap();
        let d = obs.duplicates(&c);
        assert_eq!(d.singletons, 1);
        assert_eq!(d.distinct, 3);
        let repeated: Vec<_> = d.repeated.iter().map(|r| (r.sequence.as_str(), r.count)).collect();
        assert_eq!(repeated, vec![("TTTT", 3), ("HTHT", 2)]);
    }

    #[test]
    fn symbol_histogram() {
        let c = catalog();
        let obs = ObservedCounts::from_batch(&c, ["HHHH", "HTHT", "THTH", "TTTT"]).unwrap();
        assert_eq!(obs.symbol_count_histogram(&c, 'H'), vec![1, 0, 2, 0, 1]);
    }

    #[test]
    fn empirical_probabilities_sum_to_one() {
        let c = catalog();
        let obs = ObservedCounts::from_batch(&c, ["HHHH", "HTHT", "HTHT"]).unwrap();
        let p = obs.empirical_probabilities();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((p[0] - 1.0 / 3.0).abs() < 1e-12);
    }
}
