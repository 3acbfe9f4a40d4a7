//! Plays a number of rounds at one stand threshold, logging every hand, then prints the summary.

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stand_sim::prelude::*;

#[derive(Debug, Parser)]
#[command(about = "Play and log individual rounds of blackjack")]
struct Args {
    /// Number of rounds to play.
    rounds: u32,

    #[arg(short = 't', long, default_value_t = 17)]
    stand_threshold: u8,

    #[arg(short, long, default_value_t = 1)]
    decks: usize,

    #[arg(short = 'w', long, default_value_t = 10.0)]
    wager: f64,

    #[arg(short, long, value_enum, default_value_t = BettingSystem::Flat)]
    strategy: BettingSystem,

    #[arg(long)]
    seed: Option<u64>,

    /// Replay a round up to this many times if its shoe runs out, instead of aborting.
    #[arg(long)]
    redeal: Option<u32>,
}

fn run(args: &Args) -> Result<BatchSummary, SimulationError> {
    let policy = match args.redeal {
        Some(max_attempts) => ExhaustionPolicy::Redeal { max_attempts },
        None => ExhaustionPolicy::Abort,
    };
    let config = BlackjackSimulatorConfig::new()
        .num_hands(args.rounds)
        .stand_threshold(args.stand_threshold)
        .decks_count(args.decks)
        .starting_wager(args.wager)
        .exhaustion_policy(policy)
        .build()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let simulator = BlackjackSimulator::new(config, args.strategy);
    simulator.run_with_shoes(
        || Shoe::with_rng(args.decks, &mut rng),
        |i, round, summary| {
            log::info!(
                "round #{:<6} wager {:>10.2}  player {:<28} dealer {:<28} {:<12} {:>+10.2}",
                i,
                round.wager(),
                round.player_hand().formatted(),
                round.dealer_hand().formatted(),
                summary.outcome.to_string(),
                summary.profit
            );
        },
    )
}

fn main() {
    let args = Args::parse();
    if let Err(e) = stand_sim::logging(log::LevelFilter::Info) {
        eprintln!("error: {e}");
    }

    match run(&args) {
        Ok(summary) => println!("{}", summary),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
