//! Scoring rules for the two cards a side commits in one hand.
//!
//! Same-suit pairs sum their values (doubled for Dawn and Night). Mixed pairs
//! keep the first card at face value and double the second card's own effect:
//! Dawn scores, Night banks and Dusk cancels.

use crate::model::card::Card;
use crate::model::suit::Suit;
use core::fmt;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardCombination {
    pub first: Card,
    pub second: Card,
}

/// The three effects of a combination, computed together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CombinationOutcome {
    pub immediate: u32,
    pub banked: u32,
    pub cancelled: u32,
}

impl CardCombination {
    pub const fn new(first: Card, second: Card) -> Self {
        Self { first, second }
    }

    pub fn immediate_points(&self) -> u32 {
        self.points_for(Suit::Dawn)
    }

    pub fn banked_points(&self) -> u32 {
        self.points_for(Suit::Night)
    }

    pub fn cancelled_points(&self) -> u32 {
        self.points_for(Suit::Dusk)
    }

    pub fn outcome(&self) -> CombinationOutcome {
        CombinationOutcome {
            immediate: self.immediate_points(),
            banked: self.banked_points(),
            cancelled: self.cancelled_points(),
        }
    }

    pub fn is_pair(&self) -> bool {
        self.first.suit == self.second.suit
    }

    /// Human readable summary such as `Power 6 + Bank 8`.
    pub fn description(&self) -> String {
        self.outcome().to_string()
    }

    /// Points contributed to the effect category owned by `effect`.
    fn points_for(&self, effect: Suit) -> u32 {
        let (first, second) = (self.first, self.second);
        let sum = first.points() + second.points();
        match (first.suit, second.suit) {
            (Suit::Dawn, Suit::Dawn) if effect == Suit::Dawn => sum * 2,
            (Suit::Night, Suit::Night) if effect == Suit::Night => sum * 2,
            // A Dusk pair both scores and cancels, undoubled.
            (Suit::Dusk, Suit::Dusk) if matches!(effect, Suit::Dawn | Suit::Dusk) => sum,
            (a, b) if a == b => 0,
            _ => {
                if first.suit == effect {
                    first.points()
                } else if second.suit == effect {
                    second.points() * 2
                } else {
                    0
                }
            }
        }
    }
}

impl CombinationOutcome {
    pub const fn total(&self) -> u32 {
        self.immediate + self.banked + self.cancelled
    }
}

impl fmt::Display for CombinationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            ("Power", self.immediate),
            ("Bank", self.banked),
            ("Cancel", self.cancelled),
        ];
        let mut wrote = false;
        for (label, amount) in parts.iter().filter(|(_, amount)| *amount > 0) {
            if wrote {
                f.write_str(" + ")?;
            }
            write!(f, "{label} {amount}")?;
            wrote = true;
        }
        if !wrote {
            f.write_str("No effect")?;
        }
        Ok(())
    }
}

impl fmt::Display for CardCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} then {}: {}", self.first, self.second, self.outcome())
    }
}
