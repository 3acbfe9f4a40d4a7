pub mod game;
pub mod stats;
pub mod sweep;
pub mod write;

use blackjack_lib::{BlackjackGameError, Shoe};
use game::round::{validate_stand_threshold, RoundEngine, RoundSummary};
use game::strategy::{BettingState, BettingStrategy};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use stats::{BatchSummary, RoundTally};
use std::error::Error;
use std::fmt::Display;

pub mod prelude {
    pub use super::{
        game::prelude::*, simulate, stats::BatchSummary, sweep::prelude::*, BlackjackSimulator,
        BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder, ExhaustionPolicy,
        SimulationError,
    };
}

#[derive(Debug)]
pub enum SimulationError {
    Configuration(String),
    GameError(BlackjackGameError),
    SendingError(String),
    WriteError(String),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            SimulationError::GameError(e) => write!(f, "{}", e),
            SimulationError::SendingError(s) | SimulationError::WriteError(s) => write!(f, "{}", s),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationError::GameError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BlackjackGameError> for SimulationError {
    fn from(value: BlackjackGameError) -> Self {
        match value {
            BlackjackGameError::Configuration(s) => SimulationError::Configuration(s),
            e => SimulationError::GameError(e),
        }
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(value: std::io::Error) -> Self {
        SimulationError::WriteError(format!("{}", value))
    }
}

/// What a batch does when a round runs its shoe dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Fail the whole batch with the shoe exhausted error.
    #[default]
    Abort,
    /// Replay the round with a freshly shuffled shoe and the same wager, at most `max_attempts`
    /// times.
    Redeal { max_attempts: u32 },
}

/// Struct for configuring a single `BlackjackSimulator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackjackSimulatorConfig {
    pub num_hands: u32,
    pub stand_threshold: u8,
    pub decks_count: usize,
    pub starting_wager: f64,
    pub exhaustion_policy: ExhaustionPolicy,
    pub seed: Option<u64>,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder`, allows the user to
    /// choose the number of hands played, the stand threshold, the number of decks in each shoe
    /// and the starting wager.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder::default()
    }

    /// Checks every parameter before any round is played.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.num_hands < 1 {
            return Err(SimulationError::Configuration(
                "number of hands must be at least 1".to_string(),
            ));
        }
        validate_stand_threshold(self.stand_threshold)?;
        validate_decks_count(self.decks_count)?;
        validate_wager(self.starting_wager)
    }
}

impl Default for BlackjackSimulatorConfig {
    fn default() -> Self {
        BlackjackSimulatorConfig {
            num_hands: 10_000,
            stand_threshold: 17,
            decks_count: 1,
            starting_wager: 10.0,
            exhaustion_policy: ExhaustionPolicy::Abort,
            seed: None,
        }
    }
}

/// Struct to implement the builder pattern for `BlackjackSimulatorConfig`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackjackSimulatorConfigBuilder {
    num_hands: Option<u32>,
    stand_threshold: Option<u8>,
    decks_count: Option<usize>,
    starting_wager: Option<f64>,
    exhaustion_policy: Option<ExhaustionPolicy>,
    seed: Option<u64>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Method for setting the number of independent rounds in the batch.
    pub fn num_hands(&mut self, n: u32) -> &mut Self {
        self.num_hands = Some(n);
        self
    }

    /// Method for setting the total at or above which the player stops drawing.
    pub fn stand_threshold(&mut self, threshold: u8) -> &mut Self {
        self.stand_threshold = Some(threshold);
        self
    }

    /// Method for choosing the number of decks in each freshly built shoe.
    pub fn decks_count(&mut self, decks: usize) -> &mut Self {
        self.decks_count = Some(decks);
        self
    }

    pub fn starting_wager(&mut self, wager: f64) -> &mut Self {
        self.starting_wager = Some(wager);
        self
    }

    pub fn exhaustion_policy(&mut self, policy: ExhaustionPolicy) -> &mut Self {
        self.exhaustion_policy = Some(policy);
        self
    }

    /// Method for seeding the rng so a batch can be reproduced exactly.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Method for building a validated `BlackjackSimulatorConfig`, unset fields take their
    /// defaults.
    pub fn build(&mut self) -> Result<BlackjackSimulatorConfig, SimulationError> {
        let defaults = BlackjackSimulatorConfig::default();
        let config = BlackjackSimulatorConfig {
            num_hands: self.num_hands.unwrap_or(defaults.num_hands),
            stand_threshold: self.stand_threshold.unwrap_or(defaults.stand_threshold),
            decks_count: self.decks_count.unwrap_or(defaults.decks_count),
            starting_wager: self.starting_wager.unwrap_or(defaults.starting_wager),
            exhaustion_policy: self.exhaustion_policy.unwrap_or(defaults.exhaustion_policy),
            seed: self.seed.or(defaults.seed),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Runs a batch of independent rounds under one configuration and one betting strategy.
/// Every round gets a freshly shuffled shoe, only the wager is carried from one round to the next.
pub struct BlackjackSimulator<B: BettingStrategy> {
    config: BlackjackSimulatorConfig,
    strategy: B,
}

impl<B: BettingStrategy> BlackjackSimulator<B> {
    pub fn new(config: BlackjackSimulatorConfig, strategy: B) -> Self {
        BlackjackSimulator { config, strategy }
    }

    pub fn config(&self) -> &BlackjackSimulatorConfig {
        &self.config
    }

    pub fn label(&self) -> String {
        self.strategy.label()
    }

    /// Runs the batch, seeding the rng from the config when a seed is set.
    pub fn run(&self) -> Result<BatchSummary, SimulationError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Runs the batch drawing every shoe's shuffle from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<BatchSummary, SimulationError> {
        let decks_count = self.config.decks_count;
        self.run_with_shoes(|| Shoe::with_rng(decks_count, &mut *rng), |_, _, _| {})
    }

    /// Runs the batch taking every shoe, redeals included, from `next_shoe`. `on_round` is called
    /// with the round number (from 1) and the finished round before the wager moves on.
    pub fn run_with_shoes<S, F>(
        &self,
        mut next_shoe: S,
        mut on_round: F,
    ) -> Result<BatchSummary, SimulationError>
    where
        S: FnMut() -> Result<Shoe, BlackjackGameError>,
        F: FnMut(u32, &RoundEngine, &RoundSummary),
    {
        self.config.validate()?;
        let config = &self.config;
        let mut betting = BettingState::new(config.starting_wager);
        let mut tally = RoundTally::default();

        for round in 1..=config.num_hands {
            let (engine, summary) =
                self.play_round(&mut next_shoe, betting.current_wager(), round)?;
            on_round(round, &engine, &summary);
            tally.record(&summary);
            betting.advance(&self.strategy, summary.outcome);
        }

        let summary = tally.summarize(
            self.label(),
            config.stand_threshold,
            config.decks_count,
            betting.max_wager_seen(),
        );
        log::debug!(
            "{} stand {} decks {}: win {:.2}% loss {:.2}% tie {:.2}% profit {:.2}",
            summary.label,
            summary.stand_threshold,
            summary.decks_count,
            summary.win_rate,
            summary.loss_rate,
            summary.tie_rate,
            summary.net_profit
        );
        Ok(summary)
    }

    fn play_round<S>(
        &self,
        next_shoe: &mut S,
        wager: f64,
        round: u32,
    ) -> Result<(RoundEngine, RoundSummary), SimulationError>
    where
        S: FnMut() -> Result<Shoe, BlackjackGameError>,
    {
        let mut attempts = 0;
        loop {
            let mut engine = RoundEngine::new(next_shoe()?, self.config.stand_threshold, wager)?;
            match engine.play() {
                Ok(summary) => return Ok((engine, summary)),
                Err(BlackjackGameError::ShoeExhausted) => match self.config.exhaustion_policy {
                    ExhaustionPolicy::Redeal { max_attempts } if attempts < max_attempts => {
                        attempts += 1;
                        log::warn!(
                            "shoe exhausted in round #{}, redealing ({}/{})",
                            round,
                            attempts,
                            max_attempts
                        );
                    }
                    _ => {
                        return Err(SimulationError::GameError(
                            BlackjackGameError::ShoeExhausted,
                        ))
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Runs `num_hands` rounds with the given parameters and returns their summary.
pub fn simulate<B: BettingStrategy>(
    num_hands: u32,
    stand_threshold: u8,
    decks_count: usize,
    starting_wager: f64,
    strategy: B,
) -> Result<BatchSummary, SimulationError> {
    let config = BlackjackSimulatorConfig::new()
        .num_hands(num_hands)
        .stand_threshold(stand_threshold)
        .decks_count(decks_count)
        .starting_wager(starting_wager)
        .build()?;
    BlackjackSimulator::new(config, strategy).run()
}

/// Initializes terminal logging at `level`.
pub fn logging(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
}

pub(crate) fn validate_decks_count(decks_count: usize) -> Result<(), SimulationError> {
    if decks_count < 1 {
        return Err(SimulationError::Configuration(format!(
            "decks count must be at least 1, got {}",
            decks_count
        )));
    }
    Ok(())
}

pub(crate) fn validate_wager(wager: f64) -> Result<(), SimulationError> {
    if !(wager.is_finite() && wager > 0.0) {
        return Err(SimulationError::Configuration(format!(
            "starting wager must be a positive amount, got {}",
            wager
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use blackjack_lib::{Card, Rank, Suit};
    use game::strategy::{BettingSystem, FlatBetting, MartingaleBetting};
    use BlackjackGameError::ShoeExhausted;

    fn stacked(ranks: &[Rank]) -> Shoe {
        Shoe::stacked(ranks.iter().map(|r| Card::new(*r, Suit::Hearts)).collect())
    }

    /// Runs out of cards during the deal.
    fn short_shoe() -> Result<Shoe, BlackjackGameError> {
        Ok(stacked(&[Rank::Ten, Rank::Ten]))
    }

    /// Player 19 against a dealer 18, both stand.
    fn winning_shoe() -> Result<Shoe, BlackjackGameError> {
        Ok(stacked(&[Rank::Ten, Rank::Ten, Rank::Nine, Rank::Eight]))
    }

    fn single_round(policy: ExhaustionPolicy) -> BlackjackSimulator<FlatBetting> {
        let config = BlackjackSimulatorConfig::new()
            .num_hands(1)
            .stand_threshold(17)
            .exhaustion_policy(policy)
            .build()
            .unwrap();
        BlackjackSimulator::new(config, FlatBetting)
    }

    fn config(stand_threshold: u8, decks_count: usize, seed: u64) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig::new()
            .num_hands(2_000)
            .stand_threshold(stand_threshold)
            .decks_count(decks_count)
            .starting_wager(10.0)
            .seed(seed)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let config = BlackjackSimulatorConfig::new().build().unwrap();
        assert_eq!(config, BlackjackSimulatorConfig::default());
    }

    #[test]
    fn test_invalid_configurations_rejected() {
        let cases = [
            BlackjackSimulatorConfig::new().num_hands(0).build(),
            BlackjackSimulatorConfig::new().stand_threshold(1).build(),
            BlackjackSimulatorConfig::new().stand_threshold(22).build(),
            BlackjackSimulatorConfig::new().decks_count(0).build(),
            BlackjackSimulatorConfig::new().starting_wager(0.0).build(),
            BlackjackSimulatorConfig::new()
                .starting_wager(f64::INFINITY)
                .build(),
        ];
        for case in cases {
            match case {
                Err(SimulationError::Configuration(_)) => {}
                other => panic!("expected configuration error, got {:?}", other),
            }
        }
        assert!(simulate(0, 17, 1, 10.0, FlatBetting).is_err());
    }

    #[test]
    fn test_rates_sum_to_one_hundred() {
        for threshold in [2, 11, 17, 21] {
            for decks in [1, 2, 6] {
                let summary = BlackjackSimulator::new(config(threshold, decks, 99), FlatBetting)
                    .run()
                    .unwrap();
                let total = summary.win_rate + summary.loss_rate + summary.tie_rate;
                assert!((total - 100.0).abs() < 1e-9, "rates summed to {}", total);
                assert_eq!(summary.num_hands, 2_000);
                assert_eq!(summary.key(), (threshold, decks));
            }
        }
    }

    #[test]
    fn test_single_hand_batch() {
        let summary = simulate(1, 17, 1, 10.0, MartingaleBetting).unwrap();
        assert_eq!(summary.num_hands, 1);
        assert_eq!(
            summary.win_rate + summary.loss_rate + summary.tie_rate,
            100.0
        );
    }

    #[test]
    fn test_flat_profit_matches_counts() {
        let summary = BlackjackSimulator::new(config(15, 2, 5), FlatBetting)
            .run()
            .unwrap();
        // Wins pay the wager, naturals pay an extra 0.2 of it, losses cost the wager.
        let expected = 10.0 * (summary.wins as f64 - summary.losses as f64)
            + 10.0 * 0.2 * summary.naturals as f64;
        assert!((summary.net_profit - expected).abs() < 1e-6);
        assert_eq!(summary.max_wager_seen, 10.0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let simulator = BlackjackSimulator::new(config(16, 1, 1234), MartingaleBetting);
        assert_eq!(simulator.run().unwrap(), simulator.run().unwrap());
    }

    #[test]
    fn test_martingale_grows_largest_wager() {
        let summary = BlackjackSimulator::new(config(21, 1, 8), BettingSystem::Martingale)
            .run()
            .unwrap();
        assert_eq!(summary.label, "martingale");
        // Standing only on 21 loses far more often than not, streaks of losses are certain
        // over two thousand rounds.
        assert!(summary.max_wager_seen >= 40.0);
        assert_eq!(summary.max_wager_seen % 10.0, 0.0);
    }

    #[test]
    fn test_error_conversion() {
        let err: SimulationError = BlackjackGameError::ShoeExhausted.into();
        assert!(matches!(err, SimulationError::GameError(ShoeExhausted)));
        let err: SimulationError = BlackjackGameError::Configuration("bad".to_string()).into();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn test_exhausted_shoe_aborts_batch() {
        let simulator = single_round(ExhaustionPolicy::Abort);
        let mut shoes = 0;
        let next_shoe = || {
            shoes += 1;
            short_shoe()
        };
        let result = simulator.run_with_shoes(next_shoe, |_, _, _| {});
        assert!(matches!(result, Err(SimulationError::GameError(ShoeExhausted))));
        assert_eq!(shoes, 1);
    }

    #[test]
    fn test_redeal_replays_round_with_new_shoe() {
        let simulator = single_round(ExhaustionPolicy::Redeal { max_attempts: 2 });
        let mut shoes = 0;
        let next_shoe = || {
            shoes += 1;
            if shoes <= 2 {
                short_shoe()
            } else {
                winning_shoe()
            }
        };
        let summary = simulator.run_with_shoes(next_shoe, |_, _, _| {}).unwrap();
        assert_eq!(shoes, 3);
        assert_eq!((summary.num_hands, summary.wins), (1, 1));
        assert_eq!(summary.net_profit, 10.0);
    }

    #[test]
    fn test_redeal_gives_up_after_max_attempts() {
        let simulator = single_round(ExhaustionPolicy::Redeal { max_attempts: 2 });
        let mut shoes = 0;
        let next_shoe = || {
            shoes += 1;
            short_shoe()
        };
        let result = simulator.run_with_shoes(next_shoe, |_, _, _| {});
        assert!(matches!(result, Err(SimulationError::GameError(ShoeExhausted))));
        assert_eq!(shoes, 3);
    }

    #[test]
    fn test_round_hook_sees_every_round_in_order() {
        let config = BlackjackSimulatorConfig::new()
            .num_hands(3)
            .stand_threshold(17)
            .build()
            .unwrap();
        let simulator = BlackjackSimulator::new(config, MartingaleBetting);
        // Player 17 stands against a dealer 19 every round.
        let next_shoe = || Ok(stacked(&[Rank::Ten, Rank::Ten, Rank::Seven, Rank::Nine]));
        let mut seen = vec![];
        let on_round = |round: u32, engine: &RoundEngine, summary: &RoundSummary| {
            seen.push((round, engine.wager(), summary.profit))
        };
        let summary = simulator.run_with_shoes(next_shoe, on_round).unwrap();
        assert_eq!(
            seen,
            vec![(1, 10.0, -10.0), (2, 20.0, -20.0), (3, 40.0, -40.0)]
        );
        assert_eq!(summary.net_profit, -70.0);
        assert_eq!(summary.max_wager_seen, 80.0);
    }

    #[test]
    fn test_huge_martingale_wager_never_fails_batch() {
        let config = BlackjackSimulatorConfig::new()
            .num_hands(1_000)
            .stand_threshold(21)
            .starting_wager(1e307)
            .seed(3)
            .build()
            .unwrap();
        let summary = BlackjackSimulator::new(config, MartingaleBetting)
            .run()
            .unwrap();
        assert_eq!(summary.num_hands, 1_000);
        assert!(summary.max_wager_seen.is_finite());
        assert!(summary.max_wager_seen >= 1e307);
    }
}
