//! Runs the simulator over a grid of stand thresholds and deck counts.
//!
//! The grid is walked stand threshold outer, deck count inner, and summaries always come back in
//! that order whether the configurations ran one after the other or on worker threads.

use crate::game::round::validate_stand_threshold;
use crate::game::strategy::{BettingStrategy, BettingSystem};
use crate::stats::BatchSummary;
use crate::{
    validate_decks_count, validate_wager, BlackjackSimulator, BlackjackSimulatorConfig,
    ExhaustionPolicy, SimulationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

pub mod prelude {
    pub use super::{sweep, ParameterSweep, ParameterSweepBuilder, SweepConfig};
}

/// A configured sweep for a single betting strategy.
pub struct ParameterSweep<B: BettingStrategy> {
    num_hands: u32,
    starting_wager: f64,
    stand_thresholds: Vec<u8>,
    deck_counts: Vec<usize>,
    exhaustion_policy: ExhaustionPolicy,
    seed: Option<u64>,
    strategy: B,
    cancelled: Arc<AtomicBool>,
}

impl<B: BettingStrategy> ParameterSweep<B> {
    /// Method that returns a new `ParameterSweepBuilder` for `strategy`.
    pub fn new(strategy: B) -> ParameterSweepBuilder<B> {
        ParameterSweepBuilder {
            strategy,
            num_hands: None,
            starting_wager: None,
            stand_thresholds: None,
            deck_counts: None,
            exhaustion_policy: None,
            seed: None,
        }
    }

    /// Every (stand threshold, decks count) pair in grid order.
    pub fn configurations(&self) -> Vec<(u8, usize)> {
        self.stand_thresholds
            .iter()
            .flat_map(|&t| self.deck_counts.iter().map(move |&d| (t, d)))
            .collect()
    }

    /// Handle that abandons the sweep before its next configuration once set to true.
    /// Configurations already running finish normally.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn label(&self) -> String {
        self.strategy.label()
    }

    fn simulator_config(
        &self,
        index: usize,
        stand_threshold: u8,
        decks_count: usize,
    ) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig {
            num_hands: self.num_hands,
            stand_threshold,
            decks_count,
            starting_wager: self.starting_wager,
            exhaustion_policy: self.exhaustion_policy,
            seed: self.seed.map(|s| s.wrapping_add(index as u64)),
        }
    }

    /// Runs every configuration in grid order on the current thread. If the sweep is cancelled
    /// the summaries completed so far are returned.
    pub fn run(&self) -> Result<Vec<BatchSummary>, SimulationError>
    where
        B: Clone,
    {
        let configurations = self.configurations();
        let total = configurations.len();
        let mut summaries = Vec::with_capacity(total);
        for (i, (stand_threshold, decks_count)) in configurations.into_iter().enumerate() {
            if self.cancelled.load(Ordering::SeqCst) {
                log::info!(
                    "{} sweep cancelled after {}/{} configurations",
                    self.label(),
                    i,
                    total
                );
                break;
            }
            let config = self.simulator_config(i, stand_threshold, decks_count);
            let summary = BlackjackSimulator::new(config, self.strategy.clone()).run()?;
            log::info!(
                "{:<12}{:>3}/{:<3} stand {:>2} decks {:>2}",
                self.label(),
                i + 1,
                total,
                stand_threshold,
                decks_count
            );
            summaries.push(summary);
        }
        Ok(summaries)
    }

    /// Runs the configurations on worker threads. Each worker sends its summaries over a channel
    /// tagged with their grid index, so the collected output is in the same order as `run`.
    pub fn run_parallel(&self) -> Result<Vec<BatchSummary>, SimulationError>
    where
        B: Clone + Send + 'static,
    {
        let configurations = self.configurations();
        let total = configurations.len();
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(total)
            .max(1);

        let (sender, receiver) = mpsc::channel::<(usize, Result<BatchSummary, SimulationError>)>();
        let failed = Arc::new(AtomicBool::new(false));
        let mut handles = vec![];

        for worker in 0..workers {
            let sender = sender.clone();
            let cancelled = Arc::clone(&self.cancelled);
            let failed = Arc::clone(&failed);
            let strategy = self.strategy.clone();
            let jobs = configurations
                .iter()
                .enumerate()
                .skip(worker)
                .step_by(workers)
                .map(|(i, &(t, d))| (i, self.simulator_config(i, t, d)))
                .collect::<Vec<(usize, BlackjackSimulatorConfig)>>();

            let handle = thread::spawn(move || -> Result<(), SimulationError> {
                for (i, config) in jobs {
                    if cancelled.load(Ordering::SeqCst) || failed.load(Ordering::SeqCst) {
                        break;
                    }
                    let result = BlackjackSimulator::new(config, strategy.clone()).run();
                    let is_err = result.is_err();
                    if let Err(e) = sender.send((i, result)) {
                        return Err(SimulationError::SendingError(format!("{}", e)));
                    }
                    if is_err {
                        break;
                    }
                }
                Ok(())
            });
            handles.push(handle);
        }
        // Only the workers hold senders now, the receiver ends when they all finish.
        drop(sender);

        let mut slots: Vec<Option<BatchSummary>> = vec![None; total];
        let mut first_error: Option<(usize, SimulationError)> = None;
        let mut completed = 0;
        for (i, result) in receiver {
            match result {
                Ok(summary) => {
                    completed += 1;
                    log::info!(
                        "{:<12}{:>3}/{:<3} stand {:>2} decks {:>2}",
                        self.label(),
                        completed,
                        total,
                        summary.stand_threshold,
                        summary.decks_count
                    );
                    slots[i] = Some(summary);
                }
                Err(e) => {
                    // Stop the other workers at their next configuration.
                    failed.store(true, Ordering::SeqCst);
                    if first_error.as_ref().map_or(true, |(j, _)| i < *j) {
                        first_error = Some((i, e));
                    }
                }
            }
        }

        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    return Err(SimulationError::SendingError(
                        "sweep worker thread panicked".to_string(),
                    ))
                }
            }
        }

        if let Some((_, e)) = first_error {
            return Err(e);
        }

        if completed < total {
            log::info!(
                "{} sweep cancelled after {}/{} configurations",
                self.label(),
                completed,
                total
            );
        }
        // Cancelled configurations leave gaps, completed ones keep grid order.
        Ok(slots.into_iter().flatten().collect())
    }
}

/// Struct for building a `ParameterSweep`.
pub struct ParameterSweepBuilder<B: BettingStrategy> {
    strategy: B,
    num_hands: Option<u32>,
    starting_wager: Option<f64>,
    stand_thresholds: Option<Vec<u8>>,
    deck_counts: Option<Vec<usize>>,
    exhaustion_policy: Option<ExhaustionPolicy>,
    seed: Option<u64>,
}

impl<B: BettingStrategy> ParameterSweepBuilder<B> {
    pub fn num_hands(mut self, n: u32) -> Self {
        self.num_hands = Some(n);
        self
    }

    pub fn starting_wager(mut self, wager: f64) -> Self {
        self.starting_wager = Some(wager);
        self
    }

    /// Stand thresholds in the order they should be swept.
    pub fn stand_thresholds<I: IntoIterator<Item = u8>>(mut self, thresholds: I) -> Self {
        self.stand_thresholds = Some(thresholds.into_iter().collect());
        self
    }

    /// Deck counts in the order they should be swept.
    pub fn deck_counts<I: IntoIterator<Item = usize>>(mut self, decks: I) -> Self {
        self.deck_counts = Some(decks.into_iter().collect());
        self
    }

    pub fn exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion_policy = Some(policy);
        self
    }

    /// Seeds the sweep, configuration `i` of the grid is seeded with `seed + i`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the sweep, rejecting empty or repeated grid axes and any invalid parameter.
    pub fn build(self) -> Result<ParameterSweep<B>, SimulationError> {
        let defaults = SweepConfig::default();
        let num_hands = self.num_hands.unwrap_or(defaults.num_hands);
        let starting_wager = self.starting_wager.unwrap_or(defaults.starting_wager);
        let stand_thresholds = self.stand_thresholds.unwrap_or(defaults.stand_thresholds);
        let deck_counts = self.deck_counts.unwrap_or(defaults.deck_counts);

        if num_hands < 1 {
            return Err(SimulationError::Configuration(
                "number of hands must be at least 1".to_string(),
            ));
        }
        validate_wager(starting_wager)?;
        validate_axis("stand thresholds", &stand_thresholds)?;
        validate_axis("deck counts", &deck_counts)?;
        for &threshold in &stand_thresholds {
            validate_stand_threshold(threshold)?;
        }
        for &decks in &deck_counts {
            validate_decks_count(decks)?;
        }

        Ok(ParameterSweep {
            num_hands,
            starting_wager,
            stand_thresholds,
            deck_counts,
            exhaustion_policy: self.exhaustion_policy.unwrap_or_default(),
            seed: self.seed,
            strategy: self.strategy,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }
}

fn validate_axis<T: Copy + Eq + std::hash::Hash + std::fmt::Debug>(
    name: &str,
    values: &[T],
) -> Result<(), SimulationError> {
    if values.is_empty() {
        return Err(SimulationError::Configuration(format!(
            "{} must not be empty",
            name
        )));
    }
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(*value) {
            return Err(SimulationError::Configuration(format!(
                "{} contain {:?} more than once",
                name, value
            )));
        }
    }
    Ok(())
}

/// Runs a sequential sweep of `strategy` over the given grid.
pub fn sweep<B: BettingStrategy + Clone>(
    num_hands: u32,
    starting_wager: f64,
    strategy: B,
    stand_thresholds: &[u8],
    deck_counts: &[usize],
) -> Result<Vec<BatchSummary>, SimulationError> {
    ParameterSweep::new(strategy)
        .num_hands(num_hands)
        .starting_wager(starting_wager)
        .stand_thresholds(stand_thresholds.iter().copied())
        .deck_counts(deck_counts.iter().copied())
        .build()?
        .run()
}

/// Sweep parameters as read from a JSON file. Missing fields take the defaults of the study the
/// simulator was written for: stand thresholds 11 through 20, 1, 2 and 6 decks, 10,000 hands
/// per configuration at a starting wager of 10, both betting strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub num_hands: u32,
    pub starting_wager: f64,
    pub stand_thresholds: Vec<u8>,
    pub deck_counts: Vec<usize>,
    pub strategies: Vec<BettingSystem>,
    pub exhaustion_policy: ExhaustionPolicy,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            num_hands: 10_000,
            starting_wager: 10.0,
            stand_thresholds: (11..=20).collect(),
            deck_counts: vec![1, 2, 6],
            strategies: vec![BettingSystem::Flat, BettingSystem::Martingale],
            exhaustion_policy: ExhaustionPolicy::Abort,
            seed: None,
            parallel: false,
        }
    }
}

impl SweepConfig {
    pub fn from_json_str(s: &str) -> Result<SweepConfig, SimulationError> {
        serde_json::from_str(s).map_err(|e| SimulationError::Configuration(format!("{}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<SweepConfig, SimulationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SimulationError::Configuration(format!("unable to read {}: {}", path.display(), e))
        })?;
        SweepConfig::from_json_str(&contents)
    }

    /// Builds the sweep for one of the configured strategies.
    pub fn sweep(
        &self,
        strategy: BettingSystem,
    ) -> Result<ParameterSweep<BettingSystem>, SimulationError> {
        let mut builder = ParameterSweep::new(strategy)
            .num_hands(self.num_hands)
            .starting_wager(self.starting_wager)
            .stand_thresholds(self.stand_thresholds.iter().copied())
            .deck_counts(self.deck_counts.iter().copied())
            .exhaustion_policy(self.exhaustion_policy);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }

    /// Runs the sweep of every configured strategy, in order.
    pub fn run(&self) -> Result<Vec<Vec<BatchSummary>>, SimulationError> {
        if self.strategies.is_empty() {
            return Err(SimulationError::Configuration(
                "at least one betting strategy is required".to_string(),
            ));
        }
        self.strategies
            .iter()
            .map(|&strategy| {
                let sweep = self.sweep(strategy)?;
                if self.parallel {
                    sweep.run_parallel()
                } else {
                    sweep.run()
                }
            })
            .collect()
    }
}
