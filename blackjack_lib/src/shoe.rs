use crate::card::{Card, Rank, Suit};
use crate::BlackjackGameError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of cards in a single deck.
pub const DECK_SIZE: usize = 52;

/// A shuffled collection of one or more decks that cards are drawn from without replacement.
/// The top of the shoe is the end of `cards`, so drawing is a pop.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    decks_count: usize,
}

impl Shoe {
    /// Builds a shoe of `decks_count` decks shuffled with the thread local rng.
    pub fn new(decks_count: usize) -> Result<Shoe, BlackjackGameError> {
        Shoe::with_rng(decks_count, &mut rand::thread_rng())
    }

    /// Builds a shoe of `decks_count` decks, every permutation equally likely under `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        decks_count: usize,
        rng: &mut R,
    ) -> Result<Shoe, BlackjackGameError> {
        if decks_count < 1 {
            return Err(BlackjackGameError::Configuration(format!(
                "decks count must be at least 1, got {}",
                decks_count
            )));
        }

        let mut cards = Vec::with_capacity(decks_count * DECK_SIZE);
        for _ in 0..decks_count {
            for rank in Rank::ALL {
                for suit in Suit::ALL {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        cards.shuffle(rng);

        Ok(Shoe { cards, decks_count })
    }

    /// Builds an unshuffled shoe that deals `cards` in the given order, first element first.
    pub fn stacked(cards: Vec<Card>) -> Shoe {
        let decks_count = (cards.len() + DECK_SIZE - 1) / DECK_SIZE;
        let mut cards = cards;
        cards.reverse();
        Shoe { cards, decks_count }
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Result<Card, BlackjackGameError> {
        self.cards.pop().ok_or(BlackjackGameError::ShoeExhausted)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn decks_count(&self) -> usize {
        self.decks_count
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_zero_decks_rejected() {
        match Shoe::new(0) {
            Err(BlackjackGameError::Configuration(_)) => {}
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_shoe_composition() {
        let mut rng = StdRng::seed_from_u64(7);
        let shoe = Shoe::with_rng(6, &mut rng).unwrap();
        assert_eq!(shoe.remaining(), 6 * DECK_SIZE);
        assert_eq!(shoe.decks_count(), 6);

        let mut counts: HashMap<Card, usize> = HashMap::new();
        for card in shoe.cards.iter() {
            *counts.entry(*card).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), DECK_SIZE);
        assert!(counts.values().all(|&n| n == 6));
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let a = Shoe::with_rng(2, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Shoe::with_rng(2, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = Shoe::with_rng(2, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_eq!(a.cards, b.cards);
        assert_ne!(a.cards, c.cards);
    }

    #[test]
    fn test_draw_shrinks_shoe() {
        let mut shoe = Shoe::new(1).unwrap();
        let mut drawn = Vec::new();
        while !shoe.is_empty() {
            let before = shoe.remaining();
            drawn.push(shoe.draw().unwrap());
            assert_eq!(shoe.remaining(), before - 1);
        }
        assert_eq!(drawn.len(), DECK_SIZE);
    }

    #[test]
    fn test_fifty_third_card_exhausts_single_deck() {
        let mut shoe = Shoe::new(1).unwrap();
        for _ in 0..DECK_SIZE {
            assert!(shoe.draw().is_ok());
        }
        assert_eq!(shoe.draw(), Err(BlackjackGameError::ShoeExhausted));
    }

    #[test]
    fn test_stacked_deals_in_order() {
        let cards = vec![
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Two, Suit::Clubs),
        ];
        let mut shoe = Shoe::stacked(cards.clone());
        assert_eq!(shoe.decks_count(), 1);
        for card in cards {
            assert_eq!(shoe.draw().unwrap(), card);
        }
        assert!(shoe.draw().is_err());
    }
}
