use serde::Serialize;
use std::fmt::Display;

/// The thirteen ranks of a standard deck, in the order a fresh deck is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Blackjack point value of the rank, aces count as 11 until a hand reduces them.
    pub fn point_value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rank::Ace => "Ace",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
        };
        write!(f, "{}", s)
    }
}

/// Suits carry no value in blackjack, they only make a deck complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

/// An immutable playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn point_value(&self) -> u8 {
        self.rank.point_value()
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {:?}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_point_values() {
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).point_value(), 11);
        assert_eq!(Card::new(Rank::King, Suit::Hearts).point_value(), 10);
        assert_eq!(Card::new(Rank::Queen, Suit::Clubs).point_value(), 10);
        assert_eq!(Card::new(Rank::Jack, Suit::Diamonds).point_value(), 10);
        assert_eq!(Card::new(Rank::Ten, Suit::Diamonds).point_value(), 10);
        assert_eq!(Card::new(Rank::Seven, Suit::Diamonds).point_value(), 7);
        assert_eq!(Card::new(Rank::Two, Suit::Diamonds).point_value(), 2);
    }

    #[test]
    fn test_suit_is_immaterial() {
        for suit in Suit::ALL {
            assert_eq!(Card::new(Rank::Nine, suit).point_value(), 9);
        }
    }

    #[test]
    fn test_display() {
        let ace = Card::new(Rank::Ace, Suit::Spades);
        assert_eq!(ace.to_string(), "Ace of Spades");
        let ten = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(ten.to_string(), "10 of Hearts");
    }
}
