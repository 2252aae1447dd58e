use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Which side of the table a participant sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Side {
    Player = 0,
    Enemy = 1,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player, Side::Enemy];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Side::Player),
            1 => Some(Side::Enemy),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Side::Player => "Player",
            Side::Enemy => "Enemy",
        };
        f.write_str(label)
    }
}

/// One participant: draw pile, hand, discard pile and banked power.
///
/// `banked_power` is `None` until something is banked; `Some(0)` means power
/// was banked and has since been cancelled down to nothing.
#[derive(Debug, Clone)]
pub struct Player {
    deck: Deck,
    hand: Hand,
    discard: Vec<Card>,
    banked_power: Option<u32>,
    incoming_power: u32,
    banked_power_locked: bool,
}

impl Player {
    pub const HAND_SIZE: usize = 10;
    /// Cards committed per hand.
    pub const CARDS_PER_HAND: usize = 2;

    /// Takes `deck` as the draw pile and draws the opening hand.
    pub fn deal(deck: Deck) -> Self {
        let mut player = Self::with_deck(deck);
        player.draw_to_hand_size();
        player
    }

    /// Takes `deck` as the draw pile without drawing.
    pub fn with_deck(deck: Deck) -> Self {
        Self {
            deck,
            hand: Hand::new(),
            discard: Vec::new(),
            banked_power: None,
            incoming_power: 0,
            banked_power_locked: false,
        }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn discard(&self) -> &[Card] {
        &self.discard
    }

    pub fn banked_power(&self) -> Option<u32> {
        self.banked_power
    }

    /// Power banked during the open hand, not yet merged into `banked_power`.
    pub fn incoming_power(&self) -> u32 {
        self.incoming_power
    }

    pub fn is_banked_power_locked(&self) -> bool {
        self.banked_power_locked
    }

    /// Moves the top card of the deck into the hand. No-op on an empty deck.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.deck.draw()?;
        self.hand.add(card);
        Some(card)
    }

    pub fn draw_to_hand_size(&mut self) -> usize {
        let mut drawn = 0;
        while self.hand.len() < Self::HAND_SIZE && self.draw().is_some() {
            drawn += 1;
        }
        drawn
    }

    /// Refills the hand after a hand is played. When the deck cannot supply
    /// enough cards for another hand, the discard pile is shuffled back in.
    /// Returns whether the discard pile was recycled.
    pub fn replenish<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.draw_to_hand_size();
        if self.hand.len() >= Self::CARDS_PER_HAND || self.discard.is_empty() {
            return false;
        }
        let discard = std::mem::take(&mut self.discard);
        self.deck.recycle(discard, rng);
        self.draw_to_hand_size();
        true
    }

    /// Moves `card` from the hand to the discard pile. No-op if not held.
    pub fn play_card(&mut self, card: Card) -> bool {
        if !self.hand.remove(card) {
            return false;
        }
        self.discard.push(card);
        true
    }

    /// Queues banked points earned this hand; they become spendable and
    /// cancellable once the hand settles.
    pub fn bank(&mut self, amount: u32) {
        self.incoming_power = self.incoming_power.saturating_add(amount);
    }

    /// Merges power banked during the hand into the banked total.
    pub fn settle_bank(&mut self) {
        if self.incoming_power == 0 {
            return;
        }
        let current = self.banked_power.unwrap_or(0);
        self.banked_power = Some(current.saturating_add(self.incoming_power));
        self.incoming_power = 0;
    }

    /// Reduces banked power, flooring at zero. Returns the amount removed.
    pub fn cancel(&mut self, amount: u32) -> u32 {
        match self.banked_power {
            Some(current) => {
                let removed = current.min(amount);
                self.banked_power = Some(current - removed);
                removed
            }
            None => 0,
        }
    }

    /// Takes all banked power for spending. Refused while locked or when
    /// nothing positive is banked.
    pub fn withdraw(&mut self) -> Option<u32> {
        if self.banked_power_locked {
            return None;
        }
        match self.banked_power {
            Some(amount) if amount > 0 => {
                self.banked_power = None;
                Some(amount)
            }
            _ => None,
        }
    }

    pub fn lock_banked_power(&mut self) {
        self.banked_power_locked = true;
    }

    pub fn unlock_banked_power(&mut self) {
        self.banked_power_locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, Side};
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn banked(amount: u32) -> Player {
        let mut player = Player::with_deck(Deck::empty());
        player.bank(amount);
        player.settle_bank();
        player
    }

    #[test]
    fn opponent_flips_side() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Player);
        for (i, side) in Side::BOTH.iter().enumerate() {
            assert_eq!(Side::from_index(i), Some(*side));
            assert_eq!(side.index(), i);
        }
    }

    #[test]
    fn deal_draws_ten_cards() {
        let player = Player::deal(Deck::shuffled_with_seed(9));
        assert_eq!(player.hand().len(), Player::HAND_SIZE);
        assert_eq!(player.deck_len(), 26);
        assert_eq!(player.banked_power(), None);
    }

    #[test]
    fn draw_on_empty_deck_is_noop() {
        let mut player = Player::with_deck(Deck::empty());
        assert_eq!(player.draw(), None);
        assert!(player.hand().is_empty());
    }

    #[test]
    fn playing_a_card_not_in_hand_is_noop() {
        let mut player = Player::deal(Deck::stacked(vec![Card::new(Suit::Dawn, 1)]));
        assert!(!player.play_card(Card::new(Suit::Dawn, 2)));
        assert!(player.play_card(Card::new(Suit::Dawn, 1)));
        assert_eq!(player.discard(), &[Card::new(Suit::Dawn, 1)]);
    }

    #[test]
    fn banking_accumulates_after_settling() {
        let mut player = banked(6);
        player.bank(4);
        assert_eq!(player.banked_power(), Some(6));
        assert_eq!(player.incoming_power(), 4);
        player.settle_bank();
        assert_eq!(player.banked_power(), Some(10));
    }

    #[test]
    fn settling_nothing_keeps_absence() {
        let mut player = Player::with_deck(Deck::empty());
        player.settle_bank();
        assert_eq!(player.banked_power(), None);
    }

    #[test]
    fn cancellation_floors_at_zero() {
        for b in [0u32, 1, 5, 12, 40] {
            for c in [0u32, 1, 5, 13, 100] {
                let mut player = if b == 0 {
                    let mut p = banked(3);
                    p.cancel(3);
                    p
                } else {
                    banked(b)
                };
                player.cancel(c);
                assert_eq!(player.banked_power(), Some(b.saturating_sub(c)), "b={b} c={c}");
            }
        }
    }

    #[test]
    fn cancellation_without_bank_stays_absent() {
        let mut player = Player::with_deck(Deck::empty());
        assert_eq!(player.cancel(7), 0);
        assert_eq!(player.banked_power(), None);
    }

    #[test]
    fn withdraw_respects_lock_and_clears_to_none() {
        let mut player = banked(9);
        player.lock_banked_power();
        assert_eq!(player.withdraw(), None);
        assert_eq!(player.banked_power(), Some(9));
        player.unlock_banked_power();
        assert_eq!(player.withdraw(), Some(9));
        assert_eq!(player.banked_power(), None);
    }

    #[test]
    fn withdraw_refuses_zero() {
        let mut player = banked(2);
        player.cancel(5);
        assert_eq!(player.withdraw(), None);
        assert_eq!(player.banked_power(), Some(0));
    }

    #[test]
    fn replenish_recycles_discard_when_deck_runs_dry() {
        let mut rng = StdRng::seed_from_u64(11);
        let cards = vec![Card::new(Suit::Dawn, 1), Card::new(Suit::Dawn, 2)];
        let mut player = Player::deal(Deck::stacked(cards.clone()));
        for card in cards {
            assert!(player.play_card(card));
        }
        assert!(player.hand().is_empty());
        assert!(player.replenish(&mut rng));
        assert_eq!(player.hand().len(), 2);
        assert!(player.discard().is_empty());
    }

    #[test]
    fn replenish_keeps_playable_hand_without_recycling() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut player = Player::deal(Deck::shuffled_with_seed(5));
        let played: Vec<Card> = player.hand().cards()[..2].to_vec();
        for card in played {
            player.play_card(card);
        }
        assert!(!player.replenish(&mut rng));
        assert_eq!(player.hand().len(), Player::HAND_SIZE);
        assert_eq!(player.deck_len(), 24);
    }
}
