//! The state machine that plays a single hand from the deal to a resolved outcome.

use blackjack_lib::hand::BLACKJACK;
use blackjack_lib::{BlackjackGameError, Hand, Shoe};
use serde::Serialize;
use std::fmt::Display;

/// Profit multiplier paid on a natural blackjack (6:5).
pub const BLACKJACK_PAYOUT: f64 = 1.2;
/// The dealer draws below this total and stands at or above it, soft or hard.
pub const DEALER_STANDS_ON: u16 = 17;
pub const MIN_STAND_THRESHOLD: u8 = 2;
pub const MAX_STAND_THRESHOLD: u8 = BLACKJACK as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    PlayerWin,
    DealerWin,
    Tie,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::PlayerWin => write!(f, "player wins"),
            Outcome::DealerWin => write!(f, "dealer wins"),
            Outcome::Tie => write!(f, "tie"),
        }
    }
}

/// Result of one round. `profit` is the signed change to the player's bankroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundSummary {
    pub outcome: Outcome,
    pub profit: f64,
    pub natural: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Dealing,
    BlackjackCheck,
    PlayerTurn,
    DealerTurn,
    Resolve,
    Terminal(Outcome),
}

/// Plays one hand against a shoe it owns for the lifetime of the round.
/// Every call to `step` performs exactly one transition (or one draw inside a turn).
pub struct RoundEngine {
    shoe: Shoe,
    player: Hand,
    dealer: Hand,
    stand_threshold: u8,
    wager: f64,
    state: RoundState,
    profit: f64,
    natural: bool,
}

impl RoundEngine {
    /// Associated method for setting up a round. Fails if `stand_threshold` is outside `[2, 21]`
    /// or `wager` is not a positive amount.
    pub fn new(
        shoe: Shoe,
        stand_threshold: u8,
        wager: f64,
    ) -> Result<RoundEngine, BlackjackGameError> {
        validate_stand_threshold(stand_threshold)?;
        if !(wager.is_finite() && wager > 0.0) {
            return Err(BlackjackGameError::Configuration(format!(
                "wager must be a positive amount, got {}",
                wager
            )));
        }
        Ok(RoundEngine {
            shoe,
            player: Hand::new(),
            dealer: Hand::new(),
            stand_threshold,
            wager,
            state: RoundState::Dealing,
            profit: 0.0,
            natural: false,
        })
    }

    /// Advances the round by one transition and returns the new state.
    /// Terminal states are absorbing.
    pub fn step(&mut self) -> Result<RoundState, BlackjackGameError> {
        let next = match self.state {
            RoundState::Dealing => {
                // Player, dealer, player, dealer.
                for _ in 0..2 {
                    self.player.add(self.shoe.draw()?);
                    self.dealer.add(self.shoe.draw()?);
                }
                RoundState::BlackjackCheck
            }
            RoundState::BlackjackCheck => {
                if self.player.is_natural_blackjack() {
                    self.natural = true;
                    self.finish(Outcome::PlayerWin, self.wager * BLACKJACK_PAYOUT)
                } else {
                    RoundState::PlayerTurn
                }
            }
            RoundState::PlayerTurn => {
                let total = self.player.total();
                if self.player.is_bust() {
                    self.finish(Outcome::DealerWin, -self.wager)
                } else if total == BLACKJACK || total >= u16::from(self.stand_threshold) {
                    RoundState::DealerTurn
                } else {
                    self.player.add(self.shoe.draw()?);
                    RoundState::PlayerTurn
                }
            }
            RoundState::DealerTurn => {
                if self.dealer.total() >= DEALER_STANDS_ON {
                    RoundState::Resolve
                } else {
                    self.dealer.add(self.shoe.draw()?);
                    RoundState::DealerTurn
                }
            }
            RoundState::Resolve => self.resolve(),
            RoundState::Terminal(outcome) => RoundState::Terminal(outcome),
        };

        if next != self.state {
            log::trace!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    /// Runs the round to its terminal state and returns the summary.
    pub fn play(&mut self) -> Result<RoundSummary, BlackjackGameError> {
        loop {
            if let RoundState::Terminal(_) = self.step()? {
                break;
            }
        }
        log::trace!(
            "player {} dealer {} -> {} ({:+.2})",
            self.player.formatted(),
            self.dealer.formatted(),
            self.describe_state(),
            self.profit
        );
        self.summary().ok_or_else(|| {
            BlackjackGameError::Configuration("round did not terminate".to_string())
        })
    }

    /// The summary of the round, available once a terminal state is reached.
    pub fn summary(&self) -> Option<RoundSummary> {
        match self.state {
            RoundState::Terminal(outcome) => Some(RoundSummary {
                outcome,
                profit: self.profit,
                natural: self.natural,
            }),
            _ => None,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn player_hand(&self) -> &Hand {
        &self.player
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    pub fn wager(&self) -> f64 {
        self.wager
    }

    fn resolve(&mut self) -> RoundState {
        let (player, dealer) = (self.player.total(), self.dealer.total());
        if self.dealer.is_bust() || player > dealer {
            self.finish(Outcome::PlayerWin, self.wager)
        } else if player == dealer {
            self.finish(Outcome::Tie, 0.0)
        } else {
            self.finish(Outcome::DealerWin, -self.wager)
        }
    }

    fn finish(&mut self, outcome: Outcome, profit: f64) -> RoundState {
        self.profit = profit;
        RoundState::Terminal(outcome)
    }

    fn describe_state(&self) -> String {
        match self.state {
            RoundState::Terminal(outcome) => outcome.to_string(),
            state => format!("{:?}", state),
        }
    }
}

pub fn validate_stand_threshold(stand_threshold: u8) -> Result<(), BlackjackGameError> {
    if (MIN_STAND_THRESHOLD..=MAX_STAND_THRESHOLD).contains(&stand_threshold) {
        Ok(())
    } else {
        Err(BlackjackGameError::Configuration(format!(
            "stand threshold must be within [{}, {}], got {}",
            MIN_STAND_THRESHOLD, MAX_STAND_THRESHOLD, stand_threshold
        )))
    }
}
