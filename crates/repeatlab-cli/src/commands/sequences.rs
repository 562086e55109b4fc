use log::warn;
use repeatlab_core::{ObservedCounts, SequenceCatalog, SequenceStudyConfig};
use repeatlab_stats::{MultinomialOutcome, SequenceStudyReport, analyze_sequences};

use super::{fail, percent, write_json};

pub struct SequencesCommandConfig<'a> {
    pub input_path: &'a str,
    pub alphabet: &'a str,
    pub length: usize,
    pub success: char,
    pub declared_total: Option<u64>,
    pub output_path: Option<&'a str>,
}

/// Split input text into catalog sequences. Blank lines are ignored; lines
/// that are not valid sequences are skipped with a warning and counted.
fn parse_observations(text: &str, catalog: &SequenceCatalog) -> (Vec<String>, usize) {
    let mut accepted = Vec::new();
    let mut skipped = 0;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if catalog.contains(line) {
            accepted.push(line.to_string());
        } else {
            warn!("line {}: {line:?} is not a valid sequence, skipped", lineno + 1);
            skipped += 1;
        }
    }
    (accepted, skipped)
}

/// Count the batch, then attach a declared total if the producer claimed one.
fn observe(
    catalog: &SequenceCatalog,
    batch: &[String],
    declared_total: Option<u64>,
) -> repeatlab_core::Result<ObservedCounts> {
    let counted = ObservedCounts::from_batch(catalog, batch)?;
    let Some(declared) = declared_total else {
        return Ok(counted);
    };
    let records: Vec<(&str, u64)> = counted
        .counts()
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .filter_map(|(i, &c)| catalog.get(i).map(|s| (s, c)))
        .collect();
    ObservedCounts::from_multiplicities(catalog, &records, declared)
}

pub fn run(cfg: SequencesCommandConfig<'_>) {
    let study = SequenceStudyConfig {
        alphabet: cfg.alphabet.to_string(),
        length: cfg.length,
        success_symbol: cfg.success,
    };
    study
        .validate()
        .unwrap_or_else(|e| fail("Invalid study parameters", e));
    let catalog = SequenceCatalog::new(&study.alphabet, study.length)
        .unwrap_or_else(|e| fail("Invalid sequence space", e));
    let text = std::fs::read_to_string(cfg.input_path)
        .unwrap_or_else(|e| fail(&format!("Failed to read {}", cfg.input_path), e));

    let (batch, skipped) = parse_observations(&text, &catalog);
    if skipped > 0 {
        eprintln!("Skipped {skipped} invalid line(s).");
    }
    let observed = observe(&catalog, &batch, cfg.declared_total)
        .unwrap_or_else(|e| fail("Invalid observations", e));
    let report = analyze_sequences(&catalog, &observed, study.success_symbol)
        .unwrap_or_else(|e| fail("Analysis failed", e));

    print_report(&report, catalog.len());

    if let Some(path) = cfg.output_path {
        write_json(path, &report);
    }
}

fn print_report(report: &SequenceStudyReport, space: usize) {
    println!(
        "{} sequences of length {} over {:?} ({} possible)",
        report.observations, report.length, report.alphabet, space
    );
    if report.empty_batch {
        println!("No sequences observed; the comparisons below are not meaningful.");
    }

    println!(
        "\nCount of {:?} per sequence vs Binomial(n={}, p={:.3}):",
        report.success_symbol, report.symbol_counts.n_trials, report.symbol_counts.p_success
    );
    println!(
        "  {:>4} {:>10} {:>10} {:>10}",
        "k", "Binomial", "Observed", "Share"
    );
    for row in &report.symbol_counts.rows {
        println!(
            "  {:>4} {:>10} {:>10} {:>10}",
            row.k,
            percent(row.binomial_probability),
            row.observed_frequency,
            percent(row.observed_probability)
        );
    }
    println!(
        "  TVD: {:.4}",
        report.symbol_counts.total_variation.distance
    );

    println!("\n{}", "=".repeat(60));
    let d = &report.duplicates;
    println!(
        "Distinct sequences: {}  (seen once: {}, repeated: {})",
        d.distinct,
        d.singletons,
        d.repeated.len()
    );
    for entry in &d.repeated {
        println!("  {}  x{}", entry.sequence, entry.count);
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "Whole-sequence TVD vs uniform: {:.4}",
        report.divergence.total_variation.distance
    );
    match report.divergence.multinomial {
        MultinomialOutcome::Probability {
            probability,
            ln_probability,
        } => println!(
            "Multinomial probability of these exact counts: {probability:.6e} (log10 {:.3})",
            ln_probability / std::f64::consts::LN_10
        ),
        MultinomialOutcome::ConsistencyViolation { counted, declared } => println!(
            "Multinomial probability not computed: {counted} sequences counted, {declared} declared"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_and_invalid_lines() {
        let catalog = SequenceCatalog::new("HT", 3).unwrap();
        let text = "HHT\n\n  TTT  \nHHX\nHH\nHHT\n";
        let (batch, skipped) = parse_observations(text, &catalog);
        assert_eq!(batch, vec!["HHT", "TTT", "HHT"]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn observe_without_declared_total_is_consistent() {
        let catalog = SequenceCatalog::new("HT", 2).unwrap();
        let batch = vec!["HH".to_string(), "HH".to_string(), "TH".to_string()];
        let observed = observe(&catalog, &batch, None).unwrap();
        assert_eq!(observed.total(), 3);
        assert!(observed.is_consistent());
    }

    #[test]
    fn observe_keeps_declared_total() {
        let catalog = SequenceCatalog::new("HT", 2).unwrap();
        let batch = vec!["HH".to_string(), "HH".to_string(), "TH".to_string()];
        let observed = observe(&catalog, &batch, Some(5)).unwrap();
        assert_eq!(observed.total(), 3);
        assert_eq!(observed.declared_total(), 5);
        assert_eq!(observed.counts()[catalog.index_of("HH").unwrap()], 2);
    }
}
