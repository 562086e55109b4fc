//! Monte Carlo aggregation of repeat profiles across independent trials.
//!
//! Architecture:
//! 1. Trials are split into fixed chunks of [`TRIALS_PER_CHUNK`]
//! 2. One seed per chunk is drawn, in order, from the caller's RNG
//! 3. Each chunk folds its trials into a private [`TrialAccumulator`]
//! 4. Chunk accumulators are merged (sum counts by key) in any order
//!
//! Because chunk seeds are fixed before any trial runs and `merge` is
//! commutative and associative, the result does not depend on how many
//! threads rayon uses or in which order chunks finish.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::StudyConfig;
use crate::error::Result;
use crate::profile::{RepeatProfile, TrialStatistics, profile};
use crate::sampler::Sampler;

/// Trials per independently seeded chunk.
pub const TRIALS_PER_CHUNK: usize = 1024;

// ---------------------------------------------------------------------------
// Statistics and value counts
// ---------------------------------------------------------------------------

/// Scalar statistics tracked per trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Uniques,
    Pairs,
    Triplets,
    QuadPlus,
    MaxFrequency,
    DistinctTypesSeen,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Uniques,
        Statistic::Pairs,
        Statistic::Triplets,
        Statistic::QuadPlus,
        Statistic::MaxFrequency,
        Statistic::DistinctTypesSeen,
    ];

    pub fn of(self, stats: &TrialStatistics) -> usize {
        match self {
            Statistic::Uniques => stats.uniques,
            Statistic::Pairs => stats.pairs,
            Statistic::Triplets => stats.triplets,
            Statistic::QuadPlus => stats.quad_plus,
            Statistic::MaxFrequency => stats.max_frequency,
            Statistic::DistinctTypesSeen => stats.distinct_types_seen,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Uniques => "items seen exactly once",
            Statistic::Pairs => "items seen exactly twice (pairs)",
            Statistic::Triplets => "items seen exactly three times (triplets)",
            Statistic::QuadPlus => "items seen four or more times",
            Statistic::MaxFrequency => "maximum frequency of any item",
            Statistic::DistinctTypesSeen => "distinct items seen",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Observed value → number of trials, ordered by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts(BTreeMap<usize, u64>);

impl ValueCounts {
    pub fn record(&mut self, value: usize) {
        *self.0.entry(value).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: ValueCounts) {
        for (value, count) in other.0 {
            *self.0.entry(value).or_insert(0) += count;
        }
    }

    pub fn get(&self, value: usize) -> u64 {
        self.0.get(&value).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Rows with proportions relative to `trials`. Empty when `trials == 0`.
    pub fn rows(&self, trials: u64) -> Vec<DistributionRow> {
        if trials == 0 {
            return Vec::new();
        }
        self.0
            .iter()
            .map(|(&value, &count)| DistributionRow {
                value,
                count,
                proportion: count as f64 / trials as f64,
            })
            .collect()
    }
}

/// One row of an empirical distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub value: usize,
    pub count: u64,
    pub proportion: f64,
}

/// One ranked repeat profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCount {
    pub profile: RepeatProfile,
    pub count: u64,
    pub proportion: f64,
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Running totals for a set of trials.
///
/// Threaded by value through each trial and combined with [`merge`](Self::merge),
/// which sums counts key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialAccumulator {
    trials: u64,
    values: [ValueCounts; 6],
    profiles: HashMap<RepeatProfile, u64>,
    distinct_sum: u64,
    single_pair: u64,
}

impl TrialAccumulator {
    /// Fold one trial in.
    pub fn record(mut self, stats: &TrialStatistics, sample_size: usize) -> Self {
        self.trials += 1;
        for stat in Statistic::ALL {
            self.values[stat.slot()].record(stat.of(stats));
        }
        *self.profiles.entry(stats.repeat_profile()).or_insert(0) += 1;
        self.distinct_sum += stats.distinct_types_seen as u64;
        if stats.is_single_pair(sample_size) {
            self.single_pair += 1;
        }
        self
    }

    pub fn merge(mut self, other: TrialAccumulator) -> Self {
        self.trials += other.trials;
        for (mine, theirs) in self.values.iter_mut().zip(other.values) {
            mine.merge(theirs);
        }
        for (profile, count) in other.profiles {
            *self.profiles.entry(profile).or_insert(0) += count;
        }
        self.distinct_sum += other.distinct_sum;
        self.single_pair += other.single_pair;
        self
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn values(&self, stat: Statistic) -> &ValueCounts {
        &self.values[stat.slot()]
    }

    pub fn finish(self, params: StudyParams) -> AggregateResult {
        let trials = self.trials;
        let distributions = Statistic::ALL
            .iter()
            .map(|&stat| (stat, self.values[stat.slot()].rows(trials)))
            .collect();

        let mut profile_ranking: Vec<ProfileCount> = self
            .profiles
            .into_iter()
            .map(|(profile, count)| ProfileCount {
                profile,
                count,
                proportion: count as f64 / trials.max(1) as f64,
            })
            .collect();
        profile_ranking.sort_by(|a, b| b.count.cmp(&a.count).then(a.profile.cmp(&b.profile)));

        let mean_distinct_types_seen = if trials == 0 {
            0.0
        } else {
            self.distinct_sum as f64 / trials as f64
        };

        AggregateResult {
            params,
            trials,
            distributions,
            profile_ranking,
            mean_distinct_types_seen,
            expected_distinct_types_seen: expected_distinct(
                params.population_size,
                params.sample_size,
            ),
            single_pair_count: self.single_pair,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyParams {
    pub population_size: usize,
    pub sample_size: usize,
    pub num_trials: usize,
}

/// Aggregate outcome of a Monte Carlo study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub params: StudyParams,
    pub trials: u64,
    /// Per statistic, rows sorted by value.
    pub distributions: BTreeMap<Statistic, Vec<DistributionRow>>,
    /// Sorted by count descending, then profile ascending.
    pub profile_ranking: Vec<ProfileCount>,
    pub mean_distinct_types_seen: f64,
    /// `N * (1 - (1 - 1/N)^k)`.
    pub expected_distinct_types_seen: f64,
    /// Trials where exactly one item repeated twice and everything else was unique.
    pub single_pair_count: u64,
}

impl AggregateResult {
    pub fn distribution(&self, stat: Statistic) -> &[DistributionRow] {
        self.distributions
            .get(&stat)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Proportion of trials in which `stat` took `value`.
    pub fn proportion(&self, stat: Statistic, value: usize) -> f64 {
        self.distribution(stat)
            .iter()
            .find(|row| row.value == value)
            .map_or(0.0, |row| row.proportion)
    }

    pub fn top_k(&self, k: usize) -> &[ProfileCount] {
        &self.profile_ranking[..k.min(self.profile_ranking.len())]
    }

    pub fn profile_count(&self, profile: RepeatProfile) -> u64 {
        self.profile_ranking
            .iter()
            .find(|p| p.profile == profile)
            .map_or(0, |p| p.count)
    }

    pub fn single_pair_proportion(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.single_pair_count as f64 / self.trials as f64
        }
    }

    /// Relative gap between the empirical and closed-form mean distinct count.
    pub fn distinct_mean_relative_error(&self) -> f64 {
        if self.expected_distinct_types_seen == 0.0 {
            return 0.0;
        }
        (self.mean_distinct_types_seen - self.expected_distinct_types_seen).abs()
            / self.expected_distinct_types_seen
    }
}

/// Closed-form expected number of distinct items in a sample of `sample_size`
/// drawn with replacement from `population_size` items.
pub fn expected_distinct(population_size: usize, sample_size: usize) -> f64 {
    if population_size == 0 || sample_size == 0 {
        return 0.0;
    }
    let n = population_size as f64;
    // 1 - (1 - 1/n)^k, evaluated without cancellation for large n.
    let miss_all = (sample_size as f64 * (-1.0 / n).ln_1p()).exp_m1();
    -n * miss_all
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Runs Sampler + Profiler over many independent trials.
#[derive(Debug, Clone)]
pub struct Aggregator {
    sampler: Sampler,
    params: StudyParams,
}

impl Aggregator {
    pub fn new(population_size: usize, sample_size: usize, num_trials: usize) -> Result<Self> {
        Ok(Self {
            sampler: Sampler::new(population_size)?,
            params: StudyParams {
                population_size,
                sample_size,
                num_trials,
            },
        })
    }

    pub fn from_config(config: &StudyConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.population_size, config.sample_size, config.num_trials)
    }

    pub fn params(&self) -> StudyParams {
        self.params
    }

    /// Run every trial, spreading chunks across rayon's pool.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> AggregateResult {
        let seeds = self.chunk_seeds(rng);
        let acc = seeds
            .par_iter()
            .enumerate()
            .map(|(i, &seed)| self.run_chunk(i, seed))
            .reduce(TrialAccumulator::default, TrialAccumulator::merge);
        self.finish(acc)
    }

    /// Same trials as [`run`](Self::run), on the calling thread.
    pub fn run_sequential<R: Rng + ?Sized>(&self, rng: &mut R) -> AggregateResult {
        let seeds = self.chunk_seeds(rng);
        let acc = seeds
            .iter()
            .enumerate()
            .map(|(i, &seed)| self.run_chunk(i, seed))
            .fold(TrialAccumulator::default(), TrialAccumulator::merge);
        self.finish(acc)
    }

    fn chunk_seeds<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u64> {
        let chunks = self.params.num_trials.div_ceil(TRIALS_PER_CHUNK);
        (0..chunks).map(|_| rng.random::<u64>()).collect()
    }

    fn run_chunk(&self, index: usize, seed: u64) -> TrialAccumulator {
        let start = index * TRIALS_PER_CHUNK;
        let len = TRIALS_PER_CHUNK.min(self.params.num_trials - start);
        let mut rng = StdRng::seed_from_u64(seed);
        let sample_size = self.params.sample_size;

        let acc = (0..len).fold(TrialAccumulator::default(), |acc, _| {
            let sample = self.sampler.draw(sample_size, &mut rng);
            acc.record(&profile(&sample).stats, sample_size)
        });
        debug!("chunk {index}: {len} trials from offset {start}");
        acc
    }

    fn finish(&self, acc: TrialAccumulator) -> AggregateResult {
        let result = acc.finish(self.params);
        info!(
            "{} trials (N={}, k={}): mean distinct {:.3}, expected {:.3}, {} profiles",
            result.trials,
            self.params.population_size,
            self.params.sample_size,
            result.mean_distinct_types_seen,
            result.expected_distinct_types_seen,
            result.profile_ranking.len()
        );
        result
    }
}

/// Validate parameters and run the study in parallel.
pub fn run<R: Rng + ?Sized>(
    population_size: usize,
    sample_size: usize,
    num_trials: usize,
    rng: &mut R,
) -> Result<AggregateResult> {
    Ok(Aggregator::new(population_size, sample_size, num_trials)?.run(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn stats(pairs: usize, uniques: usize) -> TrialStatistics {
        TrialStatistics {
            uniques,
            pairs,
            distinct_types_seen: uniques + pairs,
            max_frequency: if pairs > 0 { 2 } else { 1 },
            ..TrialStatistics::default()
        }
    }

    #[test]
    fn rejects_empty_population() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(run(0, 10, 10, &mut rng), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn zero_trials_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = run(10, 5, 0, &mut rng).unwrap();
        assert_eq!(r.trials, 0);
        assert!(r.profile_ranking.is_empty());
        assert!(r.distribution(Statistic::Pairs).is_empty());
        assert_eq!(r.mean_distinct_types_seen, 0.0);
        assert_eq!(r.single_pair_proportion(), 0.0);
    }

    #[test]
    fn zero_sample_size_is_all_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = run(10, 0, 50, &mut rng).unwrap();
        assert_eq!(r.trials, 50);
        assert_eq!(r.top_k(5).len(), 1);
        assert_eq!(r.top_k(5)[0].profile, RepeatProfile::default());
        assert_eq!(r.proportion(Statistic::DistinctTypesSeen, 0), 1.0);
        assert_eq!(r.expected_distinct_types_seen, 0.0);
    }

    #[test]
    fn record_and_merge_commute() {
        let a = TrialAccumulator::default()
            .record(&stats(1, 3), 5)
            .record(&stats(0, 5), 5);
        let b = TrialAccumulator::default().record(&stats(2, 1), 5);
        let ab = a.clone().merge(b.clone());
        let ba = b.merge(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.trials(), 3);
        assert_eq!(ab.values(Statistic::Pairs).get(1), 1);
        assert_eq!(ab.values(Statistic::Pairs).total(), 3);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let a = TrialAccumulator::default().record(&stats(1, 3), 5);
        assert_eq!(a.clone().merge(TrialAccumulator::default()), a);
        assert_eq!(TrialAccumulator::default().merge(a.clone()), a);
    }

    #[test]
    fn ranking_breaks_ties_by_profile() {
        let acc = TrialAccumulator::default()
            .record(&stats(2, 0), 4)
            .record(&stats(1, 2), 4)
            .record(&stats(0, 4), 4)
            .record(&stats(0, 4), 4);
        let r = acc.finish(StudyParams {
            population_size: 10,
            sample_size: 4,
            num_trials: 4,
        });
        let order: Vec<_> = r.profile_ranking.iter().map(|p| p.profile.as_tuple()).collect();
        assert_eq!(order, vec![(0, 0, 0), (1, 0, 0), (2, 0, 0)]);
        assert_eq!(r.top_k(1)[0].count, 2);
        assert_eq!(r.top_k(10).len(), 3);
        assert_eq!(r.single_pair_count, 1);
        assert!((r.profile_ranking[0].proportion - 0.5).abs() < 1e-12);
    }

    #[test]
    fn proportions_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(5);
        let r = run(64, 20, 3000, &mut rng).unwrap();
        for stat in Statistic::ALL {
            let total: f64 = r.distribution(stat).iter().map(|row| row.proportion).sum();
            assert!((total - 1.0).abs() < 1e-9, "{stat:?} sums to {total}");
        }
        let profiles: u64 = r.profile_ranking.iter().map(|p| p.count).sum();
        assert_eq!(profiles, 3000);
    }

    #[test]
    fn parallel_matches_sequential() {
        let agg = Aggregator::new(128, 30, 5 * TRIALS_PER_CHUNK + 17).unwrap();
        let par = agg.run(&mut StdRng::seed_from_u64(99));
        let seq = agg.run_sequential(&mut StdRng::seed_from_u64(99));
        assert_eq!(par, seq);
        assert_eq!(par.trials as usize, 5 * TRIALS_PER_CHUNK + 17);
    }

    #[test]
    fn expected_distinct_reference_value() {
        let e = expected_distinct(1024, 100);
        let direct = 1024.0 * (1.0 - (1.0 - 1.0 / 1024.0_f64).powi(100));
        assert!((e - direct).abs() < 1e-9);
        assert!((e - 95.3).abs() < 0.1, "got {e}");
        assert!((expected_distinct(1, 10) - 1.0).abs() < 1e-12);
        assert!((expected_distinct(10, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn population_of_one_always_collides() {
        let mut rng = StdRng::seed_from_u64(3);
        let r = run(1, 6, 100, &mut rng).unwrap();
        assert_eq!(r.proportion(Statistic::MaxFrequency, 6), 1.0);
        assert_eq!(r.top_k(1)[0].profile, RepeatProfile::new(0, 0, 1));
    }
}
