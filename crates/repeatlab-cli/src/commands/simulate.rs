use std::path::Path;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use repeatlab_core::{AggregateResult, Aggregator, RepeatProfile, Statistic, StudyConfig};
use repeatlab_stats::{prob_all_distinct, prob_exactly_one_pair};
use serde::Serialize;

use super::{fail, percent, write_json};

pub struct SimulateCommandConfig<'a> {
    pub config_path: Option<&'a str>,
    pub population: Option<usize>,
    pub sample_size: Option<usize>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub top: Option<usize>,
    pub output_path: Option<&'a str>,
}

#[derive(Serialize)]
struct ClosedForm {
    expected_distinct_types_seen: f64,
    prob_all_distinct: f64,
    prob_exactly_one_pair: f64,
}

#[derive(Serialize)]
struct SimulationOutput<'a> {
    config: &'a StudyConfig,
    elapsed_seconds: f64,
    closed_form: ClosedForm,
    result: &'a AggregateResult,
}

/// File values first, then flag overrides.
fn resolve_config(cfg: &SimulateCommandConfig<'_>) -> StudyConfig {
    let mut config = match cfg.config_path {
        Some(path) => StudyConfig::load_from_path(Path::new(path))
            .unwrap_or_else(|e| fail("Invalid study config", e)),
        None => StudyConfig::default(),
    };
    if let Some(n) = cfg.population {
        config.population_size = n;
    }
    if let Some(k) = cfg.sample_size {
        config.sample_size = k;
    }
    if let Some(t) = cfg.trials {
        config.num_trials = t;
    }
    if cfg.seed.is_some() {
        config.seed = cfg.seed;
    }
    if let Some(top) = cfg.top {
        config.top_k = top;
    }
    config
}

pub fn run(cfg: SimulateCommandConfig<'_>) {
    let config = resolve_config(&cfg);
    let aggregator =
        Aggregator::from_config(&config).unwrap_or_else(|e| fail("Invalid parameters", e));

    println!(
        "Running {} Monte Carlo trials: {} draws from {} items...",
        config.num_trials, config.sample_size, config.population_size
    );
    let t0 = Instant::now();
    let result = match config.seed {
        Some(seed) => aggregator.run(&mut StdRng::seed_from_u64(seed)),
        None => aggregator.run(&mut rand::rng()),
    };
    let elapsed = t0.elapsed().as_secs_f64();
    println!("Done in {elapsed:.2}s.");

    let n = config.population_size as u64;
    let k = config.sample_size as u64;
    let closed_form = ClosedForm {
        expected_distinct_types_seen: result.expected_distinct_types_seen,
        prob_all_distinct: prob_all_distinct(n, k),
        prob_exactly_one_pair: prob_exactly_one_pair(n, k),
    };

    for stat in [
        Statistic::Pairs,
        Statistic::Triplets,
        Statistic::MaxFrequency,
    ] {
        print_distribution(&result, stat);
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "  Mean distinct items per sample:  {:.2}",
        result.mean_distinct_types_seen
    );
    println!(
        "  Theoretical E[distinct items]:   {:.2}",
        closed_form.expected_distinct_types_seen
    );
    println!(
        "  P(one pair, rest unique):        MC {:.6}  exact {:.6}",
        result.single_pair_proportion(),
        closed_form.prob_exactly_one_pair
    );
    let none = result.profile_count(RepeatProfile::default()) as f64 / result.trials.max(1) as f64;
    println!(
        "  P(no repeats at all):            MC {:.6}  exact {:.6}",
        none, closed_form.prob_all_distinct
    );

    print_profiles(&result, config.top_k);

    if let Some(path) = cfg.output_path {
        write_json(
            path,
            &SimulationOutput {
                config: &config,
                elapsed_seconds: elapsed,
                closed_form,
                result: &result,
            },
        );
    }
}

fn print_distribution(result: &AggregateResult, stat: Statistic) {
    println!("\nDistribution of {}:", stat.label());
    println!("  {:>6} {:>10} {:>9}", "Value", "Trials", "Share");
    for row in result.distribution(stat) {
        println!(
            "  {:>6} {:>10} {:>9}",
            row.value,
            row.count,
            percent(row.proportion)
        );
    }
}

fn print_profiles(result: &AggregateResult, top_k: usize) {
    println!("\n{}", "=".repeat(60));
    println!("Top {top_k} repeat profiles (pairs, triplets, 4+):");
    println!("  {:<16} {:>10} {:>10}", "Profile", "Count", "Share");
    println!("{}", "-".repeat(60));
    for p in result.top_k(top_k) {
        println!(
            "  {:<16} {:>10} {:>10}",
            p.profile.to_string(),
            p.count,
            percent(p.proportion)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn flags<'a>() -> SimulateCommandConfig<'a> {
        SimulateCommandConfig {
            config_path: None,
            population: None,
            sample_size: None,
            trials: None,
            seed: None,
            top: None,
            output_path: None,
        }
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(resolve_config(&flags()), StudyConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"population_size": 365, "sample_size": 23, "num_trials": 10}}"#).unwrap();
        let path = f.path().to_str().unwrap().to_string();
        let cfg = SimulateCommandConfig {
            config_path: Some(&path),
            trials: Some(99),
            seed: Some(3),
            ..flags()
        };
        let config = resolve_config(&cfg);
        assert_eq!(config.population_size, 365);
        assert_eq!(config.sample_size, 23);
        assert_eq!(config.num_trials, 99);
        assert_eq!(config.seed, Some(3));
    }
}
