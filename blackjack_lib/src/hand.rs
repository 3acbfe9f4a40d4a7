use crate::card::Card;
use serde::Serialize;

pub const BLACKJACK: u16 = 21;

/// An ordered collection of cards with its best total kept up to date.
///
/// `total` is the largest value not above 21 reachable by counting some of the held aces as 1,
/// or the unavoidable bust value when no such valuation exists. `soft_aces` counts the aces still
/// valued at 11.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Hand {
    cards: Vec<Card>,
    total: u16,
    soft_aces: u8,
}

impl Hand {
    pub fn new() -> Hand {
        Hand::default()
    }

    /// Takes ownership of `card` and updates the total, reducing soft aces while over 21.
    pub fn add(&mut self, card: Card) {
        self.total += u16::from(card.point_value());
        if card.is_ace() {
            self.soft_aces += 1;
        }
        while self.total > BLACKJACK && self.soft_aces > 0 {
            self.total -= 10;
            self.soft_aces -= 1;
        }
        self.cards.push(card);
    }

    pub fn total(&self) -> u16 {
        self.total
    }

    pub fn soft_ace_count(&self) -> u8 {
        self.soft_aces
    }

    pub fn is_soft(&self) -> bool {
        self.soft_aces > 0
    }

    pub fn is_bust(&self) -> bool {
        self.total > BLACKJACK
    }

    /// Exactly two cards totalling 21.
    pub fn is_natural_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.total == BLACKJACK
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Formatted hand, intended for logging.
    pub fn formatted(&self) -> String {
        let cards = self
            .cards
            .iter()
            .map(|c| c.rank().to_string())
            .collect::<Vec<String>>()
            .join(", ");
        let soft = if self.is_soft() { "soft " } else { "" };
        format!("[{}] = {}{}", cards, soft, self.total)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};
    use crate::shoe::Shoe;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hand_of(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new();
        for rank in ranks {
            hand.add(Card::new(*rank, Suit::Clubs));
        }
        hand
    }

    /// Best total computed from scratch over every way of valuing the aces.
    fn brute_force_total(cards: &[Card]) -> u16 {
        let hard: u16 = cards
            .iter()
            .map(|c| if c.is_ace() { 1 } else { u16::from(c.point_value()) })
            .sum();
        let aces = cards.iter().filter(|c| c.is_ace()).count() as u16;
        (0..=aces)
            .map(|soft| hard + 10 * soft)
            .filter(|&t| t <= BLACKJACK)
            .max()
            .unwrap_or(hard)
    }

    #[test]
    fn test_hard_total() {
        let hand = hand_of(&[Rank::Ten, Rank::Nine]);
        assert_eq!(hand.total(), 19);
        assert!(!hand.is_soft());
        assert!(!hand.is_bust());
    }

    #[test]
    fn test_soft_ace_reduction() {
        let hand = hand_of(&[Rank::Ace, Rank::Six]);
        assert_eq!(hand.total(), 17);
        assert_eq!(hand.soft_ace_count(), 1);

        let hand = hand_of(&[Rank::Ace, Rank::Six, Rank::Nine]);
        assert_eq!(hand.total(), 16);
        assert_eq!(hand.soft_ace_count(), 0);
    }

    #[test]
    fn test_pair_of_aces() {
        let hand = hand_of(&[Rank::Ace, Rank::Ace]);
        assert_eq!(hand.total(), 12);
        assert_eq!(hand.soft_ace_count(), 1);
    }

    #[test]
    fn test_multiple_reductions_in_one_add() {
        // Soft 21 plus an ace is 32 with two soft aces; both must drop to reach 12.
        let hand = hand_of(&[Rank::Ace, Rank::King, Rank::Ace]);
        assert_eq!(hand.total(), 12);
        assert_eq!(hand.soft_ace_count(), 0);
    }

    #[test]
    fn test_bust_value() {
        let hand = hand_of(&[Rank::Ten, Rank::Six, Rank::King]);
        assert_eq!(hand.total(), 26);
        assert!(hand.is_bust());

        let hand = hand_of(&[Rank::Ace, Rank::Nine, Rank::Five, Rank::Eight]);
        assert_eq!(hand.total(), 23);
        assert!(hand.is_bust());
    }

    #[test]
    fn test_natural_blackjack() {
        assert!(hand_of(&[Rank::Ace, Rank::King]).is_natural_blackjack());
        assert!(hand_of(&[Rank::Queen, Rank::Ace]).is_natural_blackjack());
        assert!(!hand_of(&[Rank::Seven; 3]).is_natural_blackjack());
        assert!(!hand_of(&[Rank::Ten, Rank::Nine]).is_natural_blackjack());
    }

    #[test]
    fn test_total_matches_best_valuation() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let mut shoe = Shoe::with_rng(2, &mut rng).unwrap();
            let mut hand = Hand::new();
            for _ in 0..8 {
                hand.add(shoe.draw().unwrap());
                assert_eq!(hand.total(), brute_force_total(hand.cards()));
                if hand.soft_ace_count() > 0 {
                    assert!(hand.total() <= BLACKJACK);
                }
            }
        }
    }

    #[test]
    fn test_whole_shoe_in_one_hand() {
        let mut rng = StdRng::seed_from_u64(52);
        for decks in [1, 6] {
            let mut shoe = Shoe::with_rng(decks, &mut rng).unwrap();
            let mut hand = Hand::new();
            while let Ok(card) = shoe.draw() {
                hand.add(card);
                assert_eq!(hand.total(), brute_force_total(hand.cards()));
            }
            assert_eq!(hand.len(), decks * 52);
            // Every ace counts as 1: 4 x (1 + 2 + ... + 9 + 4 x 10) per deck.
            assert_eq!(hand.total(), 340 * decks as u16);
            assert_eq!(hand.soft_ace_count(), 0);
        }
    }
}
