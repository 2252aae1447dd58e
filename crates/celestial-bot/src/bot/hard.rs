use super::memory::CardMemory;
use super::scoring::{base_value, combination_value, jitter, lead_multiplier, pick_best};
use super::{BotParams, should_play_aggressive, spend_probability, wins_outright};
use crate::policy::{log_bank_decision, log_card_decision};
use celestial_core::game::snapshot::HandSummary;
use celestial_core::game::strategy::{DecisionContext, EnemyStrategy, Personality};
use celestial_core::model::card::Card;
use celestial_core::model::combination::CardCombination;
use celestial_core::model::player::Side;
use celestial_core::model::suit::Suit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What the current round means for the match, from the seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStakes {
    /// Both sides one round from the match.
    Decider,
    /// Opponent one round from the match.
    MustWin,
    /// Own side one round from the match.
    Closing,
    /// Trailing on rounds.
    Pressured,
    Open,
}

impl RoundStakes {
    pub fn classify(ctx: &DecisionContext<'_>) -> Self {
        match (ctx.own_rounds_won(), ctx.opponent_rounds_won()) {
            (2, 2) => RoundStakes::Decider,
            (_, 2) => RoundStakes::MustWin,
            (2, _) => RoundStakes::Closing,
            (own, opponent) if opponent > own => RoundStakes::Pressured,
            _ => RoundStakes::Open,
        }
    }

    pub const fn weight(self) -> f32 {
        match self {
            RoundStakes::Decider => 2.0,
            RoundStakes::MustWin => 1.8,
            RoundStakes::Closing => 1.4,
            RoundStakes::Pressured => 1.2,
            RoundStakes::Open => 1.0,
        }
    }
}

/// Moderate's evaluation plus a memory of its own plays, stakes-aware
/// importance, stronger pair bonuses and less predictable Night openings.
#[derive(Debug, Clone)]
pub struct HardStrategy<R = StdRng> {
    params: BotParams,
    rng: R,
    memory: CardMemory,
}

impl HardStrategy<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(BotParams::hard(), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> HardStrategy<R> {
    pub fn with_rng(params: BotParams, rng: R) -> Self {
        Self {
            params,
            rng,
            memory: CardMemory::new(),
        }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn memory(&self) -> &CardMemory {
        &self.memory
    }

    pub fn round_importance(ctx: &DecisionContext<'_>) -> f32 {
        let mut importance = RoundStakes::classify(ctx).weight();
        if ctx.own_hands_won() == 2 || ctx.opponent_hands_won() == 2 {
            importance *= 1.2;
        }
        if ctx.hand_point_gap().unsigned_abs() >= 10 {
            importance *= 1.1;
        }
        if ctx.own_banked() + ctx.opponent_banked() >= 12 {
            importance *= 1.1;
        }
        importance.min(3.0)
    }

    fn first_card_score(
        &mut self,
        card: Card,
        hand: &[Card],
        ctx: &DecisionContext<'_>,
        importance: f32,
        aggressive: bool,
    ) -> f32 {
        let mut score = base_value(card, &self.params)
            * importance
            * lead_multiplier(card, hand, ctx, &self.params, aggressive);

        if card.suit == Suit::Night {
            let streak = self.memory.night_opening_streak().min(8) as i32;
            score *= self.params.night_lead_repeat_penalty.powi(streak);
        }
        if card.suit == Suit::Dusk && ctx.opponent_banked() > 0 {
            let night_share = self.memory.opponent_share(Suit::Night);
            score *= 1.0 + 0.5 * (night_share - 1.0 / 3.0).max(0.0);
        }
        // Spend suits the deck will hand back; hold on to scarce ones.
        let even = 1.0 / Suit::ALL.len() as f32;
        let draw = self.memory.draw_probability(card.suit, hand);
        score *= 1.0 + self.params.draw_bias * (draw - even);

        score * jitter(&mut self.rng, self.params.jitter)
    }

    fn second_card_score(
        &mut self,
        first: Card,
        card: Card,
        ctx: &DecisionContext<'_>,
        importance: f32,
    ) -> f32 {
        let mut value = combination_value(first, card, ctx, importance, &self.params);
        let combination = CardCombination::new(first, card);
        if combination.is_pair() {
            value *= match card.suit {
                Suit::Dawn => self.params.dawn_pair_mult,
                Suit::Night => self.params.night_pair_mult,
                Suit::Dusk => 1.0,
            };
        }
        value * jitter(&mut self.rng, self.params.jitter)
    }
}

impl<R: Rng + Send> EnemyStrategy for HardStrategy<R> {
    fn name(&self) -> &str {
        "hard"
    }

    fn personality(&self) -> Personality {
        self.params.personality
    }

    fn select_first_card(&mut self, hand: &[Card], ctx: &DecisionContext<'_>) -> Card {
        let importance = Self::round_importance(ctx);
        let aggressive = should_play_aggressive(ctx);
        let scored: Vec<(Card, f32)> = hand
            .iter()
            .map(|&card| (card, self.first_card_score(card, hand, ctx, importance, aggressive)))
            .collect();
        let Some((card, score)) = pick_best(scored) else {
            panic!("hard strategy expected a non-empty hand");
        };
        log_card_decision(self.name(), ctx, "first", hand.len(), card, score, importance);
        card
    }

    fn select_second_card(
        &mut self,
        hand: &[Card],
        first: Card,
        ctx: &DecisionContext<'_>,
    ) -> Card {
        let importance = Self::round_importance(ctx);
        let scored: Vec<(Card, f32)> = hand
            .iter()
            .map(|&card| (card, self.second_card_score(first, card, ctx, importance)))
            .collect();
        let Some((card, score)) = pick_best(scored) else {
            panic!("hard strategy expected a non-empty hand");
        };
        log_card_decision(self.name(), ctx, "second", hand.len(), card, score, importance);
        card
    }

    fn should_use_banked_power(&mut self, ctx: &DecisionContext<'_>) -> bool {
        let banked = ctx.own_banked();
        let stakes = RoundStakes::classify(ctx);
        let importance = Self::round_importance(ctx);
        let opponent_on_match_point =
            ctx.opponent_rounds_won() == 2 && ctx.opponent_hands_won() == 2;
        let closing_decider = stakes == RoundStakes::Decider && ctx.own_hands_won() == 2;
        let match_point = ctx.own_rounds_won() == 2 || ctx.opponent_rounds_won() == 2;

        let (spend, reason) = if banked == 0 {
            (false, "no_power")
        } else if opponent_on_match_point || closing_decider {
            (true, "must_use")
        } else if wins_outright(ctx) {
            (true, "win_outright")
        } else if match_point && banked >= self.params.match_point_min_bank {
            (true, "match_point")
        } else if ctx.hand_point_gap() <= -i64::from(self.params.gap_override) {
            (true, "point_gap")
        } else if stakes == RoundStakes::Open && banked < self.params.save_threshold {
            (false, "save_power")
        } else {
            let probability = spend_probability(&self.params, banked, importance);
            (self.rng.gen_bool(probability), "roll")
        };
        log_bank_decision(self.name(), ctx, banked, spend, reason);
        spend
    }

    fn observe_hand(&mut self, side: Side, summary: &HandSummary) {
        self.memory.observe(side, summary);
    }
}
