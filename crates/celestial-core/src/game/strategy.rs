use crate::game::score_state::GameScoreState;
use crate::game::snapshot::HandSummary;
use crate::model::card::Card;
use crate::model::player::{Player, Side};

/// Tunable temperament shared by the heuristic strategies. All values are in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Personality {
    pub banking_probability: f32,
    pub aggressiveness: f32,
    pub high_card_preference: f32,
}

impl Personality {
    pub const fn new(
        banking_probability: f32,
        aggressiveness: f32,
        high_card_preference: f32,
    ) -> Self {
        Self {
            banking_probability,
            aggressiveness,
            high_card_preference,
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }
}

/// Read-only view of the table from one side's seat.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    side: Side,
    players: &'a [Player; 2],
    score: &'a GameScoreState,
    face_up: [Option<Card>; 2],
}

impl<'a> DecisionContext<'a> {
    pub fn new(
        side: Side,
        players: &'a [Player; 2],
        score: &'a GameScoreState,
        face_up: [Option<Card>; 2],
    ) -> Self {
        Self {
            side,
            players,
            score,
            face_up,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn own(&self) -> &'a Player {
        &self.players[self.side.index()]
    }

    pub fn opponent(&self) -> &'a Player {
        &self.players[self.side.opponent().index()]
    }

    pub fn score(&self) -> &'a GameScoreState {
        self.score
    }

    pub fn own_face_up(&self) -> Option<Card> {
        self.face_up[self.side.index()]
    }

    pub fn opponent_face_up(&self) -> Option<Card> {
        self.face_up[self.side.opponent().index()]
    }

    pub fn own_hand_points(&self) -> u32 {
        self.score.hand_points(self.side)
    }

    pub fn opponent_hand_points(&self) -> u32 {
        self.score.hand_points(self.side.opponent())
    }

    /// Own hand points minus the opponent's.
    pub fn hand_point_gap(&self) -> i64 {
        i64::from(self.own_hand_points()) - i64::from(self.opponent_hand_points())
    }

    pub fn own_hands_won(&self) -> u8 {
        self.score.hands_won(self.side)
    }

    pub fn opponent_hands_won(&self) -> u8 {
        self.score.hands_won(self.side.opponent())
    }

    pub fn own_rounds_won(&self) -> u8 {
        self.score.rounds_won(self.side)
    }

    pub fn opponent_rounds_won(&self) -> u8 {
        self.score.rounds_won(self.side.opponent())
    }

    pub fn own_banked(&self) -> u32 {
        self.own().banked_power().unwrap_or(0)
    }

    pub fn opponent_banked(&self) -> u32 {
        self.opponent().banked_power().unwrap_or(0)
    }

    pub fn is_own_bank_locked(&self) -> bool {
        self.own().is_banked_power_locked()
    }

    /// Whether withdrawing banked power would currently be accepted.
    pub fn can_withdraw(&self) -> bool {
        self.own_banked() > 0
            && !self.is_own_bank_locked()
            && self.score.banked_used_this_hand(self.side) == 0
    }
}

/// Decision capability of a computer opponent.
///
/// `hand` is never empty, and the returned card must be one of its entries.
/// Implementations may keep private state between calls but never mutate the game.
pub trait EnemyStrategy: Send {
    fn name(&self) -> &str;

    fn personality(&self) -> Personality;

    fn select_first_card(&mut self, hand: &[Card], ctx: &DecisionContext<'_>) -> Card;

    fn select_second_card(
        &mut self,
        hand: &[Card],
        first: Card,
        ctx: &DecisionContext<'_>,
    ) -> Card;

    fn should_use_banked_power(&mut self, ctx: &DecisionContext<'_>) -> bool;

    /// Called once per completed hand with the seat the strategy played.
    fn observe_hand(&mut self, _side: Side, _summary: &HandSummary) {}
}
