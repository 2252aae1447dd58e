use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque identity of a card within one deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u8);

impl CardId {
    pub const fn raw(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    pub suit: Suit,
    pub value: u8,
}

impl Card {
    pub const MIN_VALUE: u8 = 1;
    pub const MAX_VALUE: u8 = 12;
    pub const PER_SUIT: usize = Self::MAX_VALUE as usize;

    /// Panics when `value` is outside `1..=12`.
    pub fn new(suit: Suit, value: u8) -> Self {
        match Self::try_new(suit, value) {
            Some(card) => card,
            None => panic!("card value {value} outside {}..={}", Self::MIN_VALUE, Self::MAX_VALUE),
        }
    }

    pub const fn try_new(suit: Suit, value: u8) -> Option<Self> {
        if value < Self::MIN_VALUE || value > Self::MAX_VALUE {
            return None;
        }
        let id = CardId((suit as u8) * Self::MAX_VALUE + (value - 1));
        Some(Self { id, suit, value })
    }

    pub const fn id(self) -> CardId {
        self.id
    }

    pub const fn points(self) -> u32 {
        self.value as u32
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.suit, self.value)
    }
}
