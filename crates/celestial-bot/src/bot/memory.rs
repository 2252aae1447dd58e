use celestial_core::game::snapshot::HandSummary;
use celestial_core::model::card::Card;
use celestial_core::model::hand::count_suit;
use celestial_core::model::player::Side;
use celestial_core::model::suit::Suit;

/// Log of the cards a strategy has played this match, used to estimate what
/// is left in its own deck.
#[derive(Debug, Clone, Default)]
pub struct CardMemory {
    played: Vec<Card>,
    since_recycle: [u8; 3],
    night_opening_streak: u32,
    opponent_played: [u32; 3],
    hands_observed: u32,
}

impl CardMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_opening(&mut self, card: Card) {
        self.night_opening_streak = if card.suit == Suit::Night {
            self.night_opening_streak + 1
        } else {
            0
        };
        self.record_play(card);
    }

    pub fn record_play(&mut self, card: Card) {
        self.played.push(card);
        let slot = &mut self.since_recycle[card.suit.index()];
        *slot = slot.saturating_add(1);
    }

    /// Folds in a finished hand seen from `side`. Own cards are recorded here,
    /// once the engine has accepted them. A recycled deck holds every card not
    /// in hand again, so the per-cycle counts start over.
    pub fn observe(&mut self, side: Side, summary: &HandSummary) {
        let own = summary.side(side);
        self.record_opening(own.first);
        self.record_play(own.second);
        if own.recycled_deck {
            self.since_recycle = [0; 3];
        }
        let opponent = summary.side(side.opponent());
        for card in [opponent.first, opponent.second] {
            self.opponent_played[card.suit.index()] += 1;
        }
        self.hands_observed += 1;
    }

    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn night_opening_streak(&self) -> u32 {
        self.night_opening_streak
    }

    pub fn hands_observed(&self) -> u32 {
        self.hands_observed
    }

    /// Cards of `suit` still in the own deck, given the cards now in hand.
    pub fn remaining_in_suit(&self, suit: Suit, hand: &[Card]) -> usize {
        Card::PER_SUIT
            .saturating_sub(usize::from(self.since_recycle[suit.index()]))
            .saturating_sub(count_suit(hand, suit))
    }

    /// Chance that the next card drawn is of `suit`.
    pub fn draw_probability(&self, suit: Suit, hand: &[Card]) -> f32 {
        let total: usize = Suit::ALL
            .iter()
            .map(|&other| self.remaining_in_suit(other, hand))
            .sum();
        if total == 0 {
            return 0.0;
        }
        self.remaining_in_suit(suit, hand) as f32 / total as f32
    }

    /// Fraction of the opponent's observed cards that were `suit`.
    pub fn opponent_share(&self, suit: Suit) -> f32 {
        let total: u32 = self.opponent_played.iter().sum();
        if total == 0 {
            return 1.0 / Suit::ALL.len() as f32;
        }
        self.opponent_played[suit.index()] as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::test_support::hand_summary;

    #[test]
    fn night_streak_resets_on_other_suit() {
        let mut memory = CardMemory::new();
        memory.record_opening(Card::new(Suit::Night, 2));
        memory.record_opening(Card::new(Suit::Night, 5));
        assert_eq!(memory.night_opening_streak(), 2);
        memory.record_opening(Card::new(Suit::Dawn, 5));
        assert_eq!(memory.night_opening_streak(), 0);
        assert_eq!(memory.played().len(), 3);
    }

    #[test]
    fn remaining_counts_played_and_held_cards() {
        let mut memory = CardMemory::new();
        memory.record_play(Card::new(Suit::Dusk, 1));
        memory.record_play(Card::new(Suit::Dusk, 2));
        let hand = [Card::new(Suit::Dusk, 3), Card::new(Suit::Dawn, 4)];
        assert_eq!(memory.remaining_in_suit(Suit::Dusk, &hand), 9);
        assert_eq!(memory.remaining_in_suit(Suit::Dawn, &hand), 11);
        assert_eq!(memory.remaining_in_suit(Suit::Night, &hand), 12);
        let p = memory.draw_probability(Suit::Night, &hand);
        assert!((p - 12.0 / 32.0).abs() < 1e-6);
    }

    #[test]
    fn observed_hand_records_own_cards_from_that_side() {
        let mut memory = CardMemory::new();
        let summary = hand_summary(
            [
                [Card::new(Suit::Dawn, 1), Card::new(Suit::Dusk, 1)],
                [Card::new(Suit::Night, 9), Card::new(Suit::Dusk, 4)],
            ],
            [false, false],
        );
        memory.observe(Side::Enemy, &summary);
        assert_eq!(
            memory.played(),
            &[Card::new(Suit::Night, 9), Card::new(Suit::Dusk, 4)]
        );
        assert_eq!(memory.night_opening_streak(), 1);
        assert_eq!(memory.remaining_in_suit(Suit::Night, &[]), 11);
        assert_eq!(memory.opponent_share(Suit::Dawn), 0.5);
    }

    #[test]
    fn recycle_resets_cycle_counts_and_tracks_opponent() {
        let mut memory = CardMemory::new();
        let summary = hand_summary(
            [
                [Card::new(Suit::Dawn, 1), Card::new(Suit::Dusk, 1)],
                [Card::new(Suit::Night, 1), Card::new(Suit::Night, 2)],
            ],
            [false, true],
        );
        memory.observe(Side::Enemy, &summary);
        assert_eq!(memory.remaining_in_suit(Suit::Night, &[]), 12);
        assert_eq!(memory.played().len(), 2);
        assert_eq!(memory.hands_observed(), 1);
        assert_eq!(memory.opponent_share(Suit::Dawn), 0.5);
        assert_eq!(memory.opponent_share(Suit::Night), 0.0);
    }
}
