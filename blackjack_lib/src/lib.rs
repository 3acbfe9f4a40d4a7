//! Card level building blocks for simulating hands of blackjack: cards, a freshly shuffled shoe and
//! a hand that keeps its best total as cards are added.

pub mod card;
pub mod hand;
pub mod shoe;

pub use card::{Card, Rank, Suit};
pub use hand::Hand;
pub use shoe::Shoe;

use std::error::Error;
use std::fmt::Display;

/// Error type shared by everything that touches cards.
#[derive(Debug, Clone, PartialEq)]
pub enum BlackjackGameError {
    /// A parameter was rejected before any card was dealt.
    Configuration(String),
    /// A card was requested from a shoe with no cards left.
    ShoeExhausted,
}

impl Display for BlackjackGameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlackjackGameError::Configuration(s) => write!(f, "invalid configuration: {}", s),
            BlackjackGameError::ShoeExhausted => write!(f, "shoe exhausted, no cards left to draw"),
        }
    }
}

impl Error for BlackjackGameError {}
