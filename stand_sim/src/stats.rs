//! Accumulation of round results into a per configuration summary.

use crate::game::round::{Outcome, RoundSummary};
use serde::Serialize;
use std::fmt::Display;

/// Running counts for one batch, rounds are folded in with `record`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundTally {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub naturals: u32,
    pub net_profit: f64,
}

impl RoundTally {
    pub fn record(&mut self, round: &RoundSummary) {
        match round.outcome {
            Outcome::PlayerWin => self.wins += 1,
            Outcome::DealerWin => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        if round.natural {
            self.naturals += 1;
        }
        self.net_profit += round.profit;
    }

    pub fn rounds(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Turns the tally into a summary. Rates are percentages of the rounds played,
    /// a tally with no rounds reports zero rates.
    pub fn summarize(
        &self,
        label: String,
        stand_threshold: u8,
        decks_count: usize,
        max_wager_seen: f64,
    ) -> BatchSummary {
        let rounds = self.rounds();
        let pct = |n: u32| {
            if rounds == 0 {
                0.0
            } else {
                (n as f64) / (rounds as f64) * 100.0
            }
        };
        BatchSummary {
            label,
            stand_threshold,
            decks_count,
            num_hands: rounds,
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            naturals: self.naturals,
            win_rate: pct(self.wins),
            loss_rate: pct(self.losses),
            tie_rate: pct(self.ties),
            net_profit: self.net_profit,
            max_wager_seen,
        }
    }
}

/// Summary of a batch of rounds played under one (stand threshold, decks count) configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub label: String,
    pub stand_threshold: u8,
    pub decks_count: usize,
    pub num_hands: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub naturals: u32,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub tie_rate: f64,
    pub net_profit: f64,
    pub max_wager_seen: f64,
}

impl BatchSummary {
    /// The key a consumer joins summaries of different strategies on.
    pub fn key(&self) -> (u8, usize) {
        (self.stand_threshold, self.decks_count)
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of natural blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let header = format!(
            " {} | stand at {} | {} deck(s) ",
            self.label, self.stand_threshold, self.decks_count
        );
        let rows = [
            ("hands played", self.num_hands.to_string()),
            ("hands won", self.wins.to_string()),
            ("hands lost", self.losses.to_string()),
            ("hands tied", self.ties.to_string()),
            ("number of natural blackjacks", self.naturals.to_string()),
            ("win percentage", format!("{:.2}", self.win_rate)),
            ("loss percentage", format!("{:.2}", self.loss_rate)),
            ("tie percentage", format!("{:.2}", self.tie_rate)),
            ("net profit", format!("{:.2}", self.net_profit)),
            ("largest wager", format!("{:.2}", self.max_wager_seen)),
        ];
        let body = rows
            .iter()
            .map(|(name, value)| format!("{:<TEXT_WIDTH$}{:>NUM_WIDTH$}", name, value))
            .collect::<Vec<String>>()
            .join("\n");
        write!(f, "{:-^WIDTH$}\n{}", header, body)
    }
}
