//! Hand, round and match bookkeeping.
//!
//! A hand is won by the side with strictly more hand points (card points plus
//! banked power spent). A round is won by the first side to three hands and
//! a match by the first side to three rounds.

use crate::model::player::Side;
use serde::Serialize;

pub const HANDS_TO_WIN_ROUND: u8 = 3;
pub const ROUNDS_TO_WIN_MATCH: u8 = 3;
pub const MAX_ROUNDS: usize = 5;

/// Hands won by each side during one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundTally {
    pub player_hands: u8,
    pub enemy_hands: u8,
}

impl RoundTally {
    pub fn hands(&self, side: Side) -> u8 {
        match side {
            Side::Player => self.player_hands,
            Side::Enemy => self.enemy_hands,
        }
    }

    fn record(&mut self, side: Side, hands: u8) {
        match side {
            Side::Player => self.player_hands = hands,
            Side::Enemy => self.enemy_hands = hands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameScoreState {
    card_points: [u32; 2],
    banked_used: [u32; 2],
    hands_won: [u8; 2],
    rounds_won: [u8; 2],
    round_history: [RoundTally; MAX_ROUNDS],
    current_round: usize,
    hand_resolved: bool,
}

impl GameScoreState {
    pub const fn new() -> Self {
        Self {
            card_points: [0; 2],
            banked_used: [0; 2],
            hands_won: [0; 2],
            rounds_won: [0; 2],
            round_history: [RoundTally {
                player_hands: 0,
                enemy_hands: 0,
            }; MAX_ROUNDS],
            current_round: 0,
            hand_resolved: false,
        }
    }

    /// Overwrites the card-point component of the open hand.
    pub fn set_card_points(&mut self, amount: u32, side: Side) {
        self.card_points[side.index()] = amount;
    }

    /// Records banked power spent into the open hand.
    pub fn use_banked_power(&mut self, amount: u32, side: Side) {
        self.banked_used[side.index()] = amount;
    }

    pub fn card_points(&self, side: Side) -> u32 {
        self.card_points[side.index()]
    }

    pub fn banked_used_this_hand(&self, side: Side) -> u32 {
        self.banked_used[side.index()]
    }

    pub fn hand_points(&self, side: Side) -> u32 {
        self.card_points(side) + self.banked_used_this_hand(side)
    }

    pub fn player_hand_points(&self) -> u32 {
        self.hand_points(Side::Player)
    }

    pub fn enemy_hand_points(&self) -> u32 {
        self.hand_points(Side::Enemy)
    }

    pub fn hands_won(&self, side: Side) -> u8 {
        self.hands_won[side.index()]
    }

    pub fn rounds_won(&self, side: Side) -> u8 {
        self.rounds_won[side.index()]
    }

    pub fn round_history(&self) -> &[RoundTally; MAX_ROUNDS] {
        &self.round_history
    }

    /// Zero-based index of the round in progress.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn is_hand_resolved(&self) -> bool {
        self.hand_resolved
    }

    /// Side ahead on points in the open hand, `None` on a tie.
    pub fn hand_leader(&self) -> Option<Side> {
        let player = self.player_hand_points();
        let enemy = self.enemy_hand_points();
        if player > enemy {
            Some(Side::Player)
        } else if enemy > player {
            Some(Side::Enemy)
        } else {
            None
        }
    }

    pub fn round_winner(&self) -> Option<Side> {
        Side::BOTH
            .iter()
            .copied()
            .find(|side| self.hands_won(*side) >= HANDS_TO_WIN_ROUND)
    }

    pub fn is_round_decided(&self) -> bool {
        self.round_winner().is_some()
    }

    pub fn match_winner(&self) -> Option<Side> {
        Side::BOTH
            .iter()
            .copied()
            .find(|side| self.rounds_won(*side) >= ROUNDS_TO_WIN_MATCH)
    }

    pub fn is_match_decided(&self) -> bool {
        self.match_winner().is_some()
    }

    /// Awards the open hand to the side with more points. Returns the winner,
    /// or `None` on a tie or when the hand, round or match is already settled.
    pub fn finish_hand(&mut self) -> Option<Side> {
        if self.hand_resolved || self.is_round_decided() || self.is_match_decided() {
            return None;
        }
        self.hand_resolved = true;

        let winner = self.hand_leader()?;
        let idx = winner.index();
        self.hands_won[idx] += 1;
        let hands = self.hands_won[idx];
        if let Some(tally) = self.round_history.get_mut(self.current_round) {
            tally.record(winner, hands);
        }
        if hands >= HANDS_TO_WIN_ROUND {
            self.rounds_won[idx] += 1;
        }
        Some(winner)
    }

    /// Moves to the next round if the current one is decided.
    pub fn finish_round(&mut self) -> bool {
        if !self.is_round_decided() {
            return false;
        }
        self.current_round = (self.current_round + 1).min(MAX_ROUNDS);
        self.hands_won = [0; 2];
        true
    }

    /// Clears both sides' hand components before a new hand.
    pub fn reset_hand_points(&mut self) {
        self.card_points = [0; 2];
        self.banked_used = [0; 2];
        self.hand_resolved = false;
    }
}

impl Default for GameScoreState {
    fn default() -> Self {
        Self::new()
    }
}
