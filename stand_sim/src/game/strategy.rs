//! Betting progressions. A strategy only decides the next wager from the previous round,
//! `BettingState` carries the wager between rounds and records the largest one seen.

use crate::game::round::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod prelude {
    pub use super::{BettingState, BettingStrategy, BettingSystem, FlatBetting, MartingaleBetting};
}

/// Trait for a generic betting strategy. Implementors must be deterministic in their inputs.
pub trait BettingStrategy {
    /// Returns the wager for the next round given how the previous round went.
    fn next_wager(
        &self,
        previous_outcome: Outcome,
        previous_wager: f64,
        starting_wager: f64,
    ) -> f64;

    /// A short name used to label summaries.
    fn label(&self) -> String;
}

/// Always bets the starting wager.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBetting;

impl BettingStrategy for FlatBetting {
    fn next_wager(
        &self,
        _previous_outcome: Outcome,
        _previous_wager: f64,
        starting_wager: f64,
    ) -> f64 {
        starting_wager
    }

    fn label(&self) -> String {
        "flat".to_string()
    }
}

/// Doubles the wager after every loss and resets after every win, ties leave it unchanged.
/// There is no table limit, a long losing streak grows the wager until it saturates at
/// `f64::MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MartingaleBetting;

impl BettingStrategy for MartingaleBetting {
    fn next_wager(
        &self,
        previous_outcome: Outcome,
        previous_wager: f64,
        starting_wager: f64,
    ) -> f64 {
        match previous_outcome {
            Outcome::PlayerWin => starting_wager,
            Outcome::DealerWin => (previous_wager * 2.0).min(f64::MAX),
            Outcome::Tie => previous_wager,
        }
    }

    fn label(&self) -> String {
        "martingale".to_string()
    }
}

/// Runtime choice between the betting strategies, used by the binaries and sweep configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BettingSystem {
    Flat,
    Martingale,
}

impl BettingStrategy for BettingSystem {
    fn next_wager(
        &self,
        previous_outcome: Outcome,
        previous_wager: f64,
        starting_wager: f64,
    ) -> f64 {
        match self {
            BettingSystem::Flat => {
                FlatBetting.next_wager(previous_outcome, previous_wager, starting_wager)
            }
            BettingSystem::Martingale => {
                MartingaleBetting.next_wager(previous_outcome, previous_wager, starting_wager)
            }
        }
    }

    fn label(&self) -> String {
        match self {
            BettingSystem::Flat => FlatBetting.label(),
            BettingSystem::Martingale => MartingaleBetting.label(),
        }
    }
}

impl Display for BettingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Wager carried across the rounds of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BettingState {
    starting_wager: f64,
    current_wager: f64,
    max_wager_seen: f64,
}

impl BettingState {
    pub fn new(starting_wager: f64) -> BettingState {
        BettingState {
            starting_wager,
            current_wager: starting_wager,
            max_wager_seen: starting_wager,
        }
    }

    pub fn current_wager(&self) -> f64 {
        self.current_wager
    }

    pub fn max_wager_seen(&self) -> f64 {
        self.max_wager_seen
    }

    pub fn starting_wager(&self) -> f64 {
        self.starting_wager
    }

    /// Moves the state to the wager for the next round and returns it.
    pub fn advance<B: BettingStrategy + ?Sized>(&mut self, strategy: &B, outcome: Outcome) -> f64 {
        self.current_wager = strategy.next_wager(outcome, self.current_wager, self.starting_wager);
        if self.current_wager > self.max_wager_seen {
            self.max_wager_seen = self.current_wager;
        }
        self.current_wager
    }
}
