use clap::{Parser, ValueEnum};
use stand_sim::prelude::*;
use stand_sim::write;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One table row per configuration.
    Table,
    /// A labelled block per configuration.
    Detailed,
    Json,
}

/// Sweeps stand thresholds and deck counts, simulating independent hands of blackjack under flat
/// or martingale betting.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// JSON file with sweep parameters, flags given on the command line take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hands simulated per configuration.
    #[arg(short, long)]
    num_hands: Option<u32>,

    #[arg(short = 'w', long)]
    starting_wager: Option<f64>,

    /// Comma separated stand thresholds, e.g. 11,12,13.
    #[arg(short = 't', long, value_delimiter = ',')]
    stand_thresholds: Option<Vec<u8>>,

    /// Comma separated deck counts, e.g. 1,2,6.
    #[arg(short, long, value_delimiter = ',')]
    deck_counts: Option<Vec<usize>>,

    /// Betting strategies to sweep, repeat the flag for more than one.
    #[arg(short, long, value_enum)]
    strategy: Vec<BettingSystem>,

    #[arg(long)]
    seed: Option<u64>,

    /// Replay a round up to this many times if its shoe runs out, instead of aborting.
    #[arg(long)]
    redeal: Option<u32>,

    /// Run the configurations of a sweep on worker threads.
    #[arg(short, long)]
    parallel: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write results to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    fn sweep_config(&self) -> Result<SweepConfig, SimulationError> {
        let mut config = match self.config {
            Some(ref path) => SweepConfig::from_json_file(path)?,
            None => SweepConfig::default(),
        };
        if let Some(n) = self.num_hands {
            config.num_hands = n;
        }
        if let Some(wager) = self.starting_wager {
            config.starting_wager = wager;
        }
        if let Some(ref thresholds) = self.stand_thresholds {
            config.stand_thresholds = thresholds.clone();
        }
        if let Some(ref decks) = self.deck_counts {
            config.deck_counts = decks.clone();
        }
        if !self.strategy.is_empty() {
            config.strategies = self.strategy.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(max_attempts) = self.redeal {
            config.exhaustion_policy = ExhaustionPolicy::Redeal { max_attempts };
        }
        config.parallel |= self.parallel;
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<(), SimulationError> {
    let config = cli.sweep_config()?;
    log::info!(
        "sweeping {} stand thresholds x {} deck counts, {} hands each, strategies {:?}",
        config.stand_thresholds.len(),
        config.deck_counts.len(),
        config.num_hands,
        config.strategies
    );

    let summaries = config
        .run()?
        .into_iter()
        .flatten()
        .collect::<Vec<BatchSummary>>();

    let writer: Box<dyn Write> = match cli.output {
        Some(ref path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    match cli.format {
        OutputFormat::Table => write::write_summaries(&summaries, writer)?,
        OutputFormat::Detailed => write::write_detailed(&summaries, writer)?,
        OutputFormat::Json => write::write_json(&summaries, writer)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = stand_sim::logging(cli.log_level()) {
        eprintln!("error: {e}");
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
