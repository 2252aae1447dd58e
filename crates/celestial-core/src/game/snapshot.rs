use crate::game::score_state::{MAX_ROUNDS, RoundTally};
use crate::model::card::Card;
use crate::model::combination::{CardCombination, CombinationOutcome};
use crate::model::player::Side;
use serde::Serialize;

/// One side's part of a completed hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SideSummary {
    pub first: Card,
    pub second: Card,
    pub outcome: CombinationOutcome,
    pub banked_used: u32,
    pub hand_points: u32,
    pub recycled_deck: bool,
}

impl SideSummary {
    pub fn combination(&self) -> CardCombination {
        CardCombination::new(self.first, self.second)
    }
}

/// Record of a completed hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandSummary {
    pub hand_number: u32,
    pub round: usize,
    pub player: SideSummary,
    pub enemy: SideSummary,
    pub winner: Option<Side>,
    pub round_winner: Option<Side>,
    pub match_winner: Option<Side>,
}

impl HandSummary {
    pub fn side(&self, side: Side) -> &SideSummary {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }
}

/// Display state of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSnapshot {
    pub hand_size: usize,
    pub deck_size: usize,
    pub banked_power: Option<u32>,
    pub banked_power_locked: bool,
    pub face_up: Option<Card>,
    pub second: Option<Card>,
    pub card_points: u32,
    pub banked_used: u32,
    pub hands_won: u8,
    pub rounds_won: u8,
}

/// Serialisable read-only view for score tables and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub current_round: usize,
    pub hands_played: u32,
    pub round_history: [RoundTally; MAX_ROUNDS],
    pub player: SideSnapshot,
    pub enemy: SideSnapshot,
    pub round_complete: bool,
    pub match_complete: bool,
    pub match_winner: Option<Side>,
}

impl GameSnapshot {
    pub fn side(&self, side: Side) -> &SideSnapshot {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
