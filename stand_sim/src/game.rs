//! Module that focuses on a single hand of blackjack, the state machine that plays it and the
//! betting strategies that decide what is wagered on the next one.

pub mod round;
pub mod strategy;

pub mod prelude {
    pub use super::round::{Outcome, RoundEngine, RoundState, RoundSummary, BLACKJACK_PAYOUT};
    pub use super::strategy::prelude::*;
    pub use blackjack_lib::{BlackjackGameError, Card, Hand, Rank, Shoe, Suit};
}
