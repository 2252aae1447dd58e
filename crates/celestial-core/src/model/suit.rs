use core::fmt;
use serde::{Deserialize, Serialize};

/// The three celestial suits. The ordering is only used to sort hands for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Dawn = 0,
    Dusk = 1,
    Night = 2,
}

impl Suit {
    pub const ALL: [Suit; 3] = [Suit::Dawn, Suit::Dusk, Suit::Night];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Dawn),
            1 => Some(Suit::Dusk),
            2 => Some(Suit::Night),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Dawn scores immediately.
    pub const fn scores(self) -> bool {
        matches!(self, Suit::Dawn)
    }

    /// Night banks power for later hands.
    pub const fn banks(self) -> bool {
        matches!(self, Suit::Night)
    }

    /// Dusk cancels the opponent's banked power and locks it when led.
    pub const fn cancels(self) -> bool {
        matches!(self, Suit::Dusk)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Suit::Dawn => "Dawn",
            Suit::Dusk => "Dusk",
            Suit::Night => "Night",
        };
        f.write_str(label)
    }
}
