use crate::model::card::Card;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Draw pile. The top of the deck is the end of the backing vector.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub const SIZE: usize = Suit::ALL.len() * Card::PER_SUIT;

    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(Self::SIZE);
        for suit in Suit::ALL.iter().copied() {
            for value in Card::MIN_VALUE..=Card::MAX_VALUE {
                cards.push(Card::new(suit, value));
            }
        }
        Self { cards }
    }

    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    /// A deck whose next draws are `cards` in order.
    pub fn stacked(cards: Vec<Card>) -> Self {
        let mut cards = cards;
        cards.reverse();
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Puts `cards` back under the remaining cards and reshuffles the whole pile.
    pub fn recycle<R: rand::Rng + ?Sized>(&mut self, cards: Vec<Card>, rng: &mut R) {
        self.cards.extend(cards);
        self.shuffle_in_place(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::card::Card;
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn standard_deck_has_36_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 36);
        let mut ids: Vec<_> = deck.cards().iter().map(|c| c.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 36);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn stacked_deck_draws_in_given_order() {
        let first = Card::new(Suit::Dawn, 1);
        let second = Card::new(Suit::Night, 9);
        let mut deck = Deck::stacked(vec![first, second]);
        assert_eq!(deck.draw(), Some(first));
        assert_eq!(deck.draw(), Some(second));
        assert_eq!(deck.draw(), None);
    }

    #[test]
    fn recycle_returns_cards_to_the_pile() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut deck = Deck::empty();
        deck.recycle(vec![Card::new(Suit::Dusk, 4), Card::new(Suit::Dusk, 5)], &mut rng);
        assert_eq!(deck.len(), 2);
    }
}
