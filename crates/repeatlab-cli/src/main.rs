//! CLI for repeatlab: collision profiles of random samples, checked against theory.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "repeatlab")]
#[command(about = "repeatlab: collision profiles of random samples, checked against theory")]
#[command(version = repeatlab_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monte Carlo repeat-profile study: draw samples with replacement and
    /// tabulate pairs, triplets, 4+ repeats, max frequency and distinct counts.
    Simulate {
        /// JSON study config; flags below override its fields
        #[arg(long)]
        config: Option<String>,

        /// Number of distinct items in the population
        #[arg(long)]
        population: Option<usize>,

        /// Items drawn per trial
        #[arg(long)]
        sample_size: Option<usize>,

        /// Number of independent trials
        #[arg(long)]
        trials: Option<usize>,

        /// Master RNG seed (default: OS entropy)
        #[arg(long)]
        seed: Option<u64>,

        /// Number of ranked repeat profiles to print
        #[arg(long)]
        top: Option<usize>,

        /// Write the full aggregate result as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Compare observed fixed-length sequences (one per line) against the
    /// uniform and binomial models.
    Sequences {
        /// File with one sequence per line
        input: String,

        /// Alphabet symbols
        #[arg(long, default_value = "HT")]
        alphabet: String,

        /// Sequence length
        #[arg(long, default_value = "10")]
        length: usize,

        /// Symbol counted as a success in the binomial comparison
        #[arg(long, default_value = "H")]
        success: char,

        /// Number of observations the producer claims (default: lines accepted)
        #[arg(long)]
        declared_total: Option<u64>,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the binomial pmf table for n trials with success probability p
    Binomial {
        #[arg(long, default_value = "10")]
        trials: u64,

        #[arg(long, default_value = "0.5")]
        p: f64,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            population,
            sample_size,
            trials,
            seed,
            top,
            output,
        } => commands::simulate::run(commands::simulate::SimulateCommandConfig {
            config_path: config.as_deref(),
            population,
            sample_size,
            trials,
            seed,
            top,
            output_path: output.as_deref(),
        }),
        Commands::Sequences {
            input,
            alphabet,
            length,
            success,
            declared_total,
            output,
        } => commands::sequences::run(commands::sequences::SequencesCommandConfig {
            input_path: &input,
            alphabet: &alphabet,
            length,
            success,
            declared_total,
            output_path: output.as_deref(),
        }),
        Commands::Binomial { trials, p } => commands::binomial::run(trials, p),
    }
}
