use super::scoring::{base_value, combination_value, jitter, lead_multiplier, pick_best};
use super::{BotParams, should_play_aggressive, spend_probability, wins_outright};
use crate::policy::{log_bank_decision, log_card_decision};
use celestial_core::game::strategy::{DecisionContext, EnemyStrategy, Personality};
use celestial_core::model::card::Card;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Single-pass heuristic: scores every card in hand and plays the best.
#[derive(Debug, Clone)]
pub struct ModerateStrategy<R = StdRng> {
    params: BotParams,
    rng: R,
}

impl ModerateStrategy<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(BotParams::moderate(), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ModerateStrategy<R> {
    pub fn with_rng(params: BotParams, rng: R) -> Self {
        Self { params, rng }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    /// How much the open hand matters, from rounds won, hands won, the point
    /// gap and the amount of banked power on the table.
    pub fn round_importance(ctx: &DecisionContext<'_>) -> f32 {
        let mut importance = 1.0;
        if ctx.own_rounds_won() == 2 || ctx.opponent_rounds_won() == 2 {
            importance += 0.4;
        }
        if ctx.opponent_rounds_won() > ctx.own_rounds_won() {
            importance += 0.15;
        }
        if ctx.own_hands_won() == 2 || ctx.opponent_hands_won() == 2 {
            importance += 0.25;
        }
        if ctx.hand_point_gap().unsigned_abs() >= 10 {
            importance += 0.15;
        }
        if ctx.own_banked() + ctx.opponent_banked() >= 12 {
            importance += 0.1;
        }
        f32::min(importance, 2.5)
    }

    fn first_card_score(
        &mut self,
        card: Card,
        hand: &[Card],
        ctx: &DecisionContext<'_>,
        importance: f32,
        aggressive: bool,
    ) -> f32 {
        let score = base_value(card, &self.params)
            * importance
            * lead_multiplier(card, hand, ctx, &self.params, aggressive);
        score * jitter(&mut self.rng, self.params.jitter)
    }
}

impl<R: Rng + Send> EnemyStrategy for ModerateStrategy<R> {
    fn name(&self) -> &str {
        "moderate"
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
            panic!("moderate strategy expected a non-empty hand");
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
            .map(|&card| {
                let value = combination_value(first, card, ctx, importance, &self.params);
                (card, value * jitter(&mut self.rng, self.params.jitter))
            })
            .collect();
        let Some((card, score)) = pick_best(scored) else {
            panic!("moderate strategy expected a non-empty hand");
        };
        log_card_decision(self.name(), ctx, "second", hand.len(), card, score, importance);
        card
    }

    fn should_use_banked_power(&mut self, ctx: &DecisionContext<'_>) -> bool {
        let banked = ctx.own_banked();
        let importance = Self::round_importance(ctx);
        let match_point = ctx.own_rounds_won() == 2 || ctx.opponent_rounds_won() == 2;

        let (spend, reason) = if banked == 0 {
            (false, "no_power")
        } else if wins_outright(ctx) {
            (true, "win_outright")
        } else if match_point && banked >= self.params.match_point_min_bank {
            (true, "match_point")
        } else if ctx.hand_point_gap() <= -i64::from(self.params.gap_override) {
            (true, "point_gap")
        } else {
            let probability = spend_probability(&self.params, banked, importance);
            (self.rng.gen_bool(probability), "roll")
        };
        log_bank_decision(self.name(), ctx, banked, spend, reason);
        spend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::test_support::{player_with, score_after};
    use celestial_core::game::score_state::GameScoreState;
    use celestial_core::model::player::Side;
    use celestial_core::model::suit::Suit;

    fn steady() -> ModerateStrategy {
        ModerateStrategy::with_rng(BotParams::moderate().with_jitter(0.0), StdRng::seed_from_u64(9))
    }

    fn card(suit: Suit, value: u8) -> Card {
        Card::new(suit, value)
    }

    #[test]
    fn equal_scores_resolve_to_first_card_in_hand() {
        let mut params = BotParams::moderate().with_jitter(0.0);
        params.dusk_idle_mult = 1.0;
        let mut strategy = ModerateStrategy::with_rng(params, StdRng::seed_from_u64(1));
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 0),
        ];
        let score = GameScoreState::new();
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, [None; 2]);

        let hand = [card(Suit::Dusk, 5), card(Suit::Night, 5)];
        assert_eq!(strategy.select_first_card(&hand, &ctx), card(Suit::Dusk, 5));
        let reversed = [card(Suit::Night, 5), card(Suit::Dusk, 5)];
        assert_eq!(strategy.select_first_card(&reversed, &ctx), card(Suit::Night, 5));
    }

    #[test]
    fn leads_night_when_pair_is_in_hand() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 0),
        ];
        let score = GameScoreState::new();
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, [None; 2]);
        let hand = [card(Suit::Dawn, 6), card(Suit::Night, 6), card(Suit::Night, 7)];
        assert_eq!(strategy.select_first_card(&hand, &ctx), card(Suit::Night, 7));
    }

    #[test]
    fn leads_dusk_against_banked_power() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 10),
            player_with(&[card(Suit::Dawn, 2)], 0),
        ];
        let score = GameScoreState::new();
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, [None; 2]);
        let hand = [card(Suit::Dusk, 9), card(Suit::Night, 3)];
        assert_eq!(strategy.select_first_card(&hand, &ctx), card(Suit::Dusk, 9));
    }

    #[test]
    fn completes_night_pair_on_second_card() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 0),
        ];
        let score = GameScoreState::new();
        let face_up = [Some(card(Suit::Dawn, 1)), Some(card(Suit::Night, 4))];
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, face_up);
        let hand = [card(Suit::Dawn, 2), card(Suit::Dusk, 3), card(Suit::Night, 11)];
        assert_eq!(
            strategy.select_second_card(&hand, card(Suit::Night, 4), &ctx),
            card(Suit::Night, 11)
        );
    }

    #[test]
    fn spends_when_bank_wins_outright() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 40),
        ];
        let score = GameScoreState::new();
        let face_up = [Some(card(Suit::Dusk, 1)), Some(card(Suit::Night, 2))];
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, face_up);
        assert!(strategy.should_use_banked_power(&ctx));
    }

    #[test]
    fn never_spends_without_power() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 30),
            player_with(&[card(Suit::Dawn, 2)], 0),
        ];
        let score = score_after([2, 2], [2, 2]);
        let face_up = [Some(card(Suit::Dawn, 12)), Some(card(Suit::Night, 2))];
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, face_up);
        assert!(!strategy.should_use_banked_power(&ctx));
    }

    #[test]
    fn point_gap_forces_spend() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 5),
        ];
        let mut score = GameScoreState::new();
        score.set_card_points(12, Side::Player);
        let face_up = [Some(card(Suit::Dawn, 12)), Some(card(Suit::Night, 2))];
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, face_up);
        assert!(strategy.should_use_banked_power(&ctx));
    }

    #[test]
    fn match_point_forces_spend() {
        let mut strategy = steady();
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 6),
        ];
        let score = score_after([0, 2], [0, 0]);
        let face_up = [Some(card(Suit::Dawn, 12)), Some(card(Suit::Night, 2))];
        let ctx = DecisionContext::new(Side::Enemy, &players, &score, face_up);
        assert!(strategy.should_use_banked_power(&ctx));
    }

    #[test]
    fn importance_grows_near_match_point() {
        let players = [
            player_with(&[card(Suit::Dawn, 1)], 0),
            player_with(&[card(Suit::Dawn, 2)], 0),
        ];
        let calm = GameScoreState::new();
        let tense = score_after([2, 1], [2, 0]);
        let calm_ctx = DecisionContext::new(Side::Enemy, &players, &calm, [None; 2]);
        let tense_ctx = DecisionContext::new(Side::Enemy, &players, &tense, [None; 2]);
        assert_eq!(ModerateStrategy::<StdRng>::round_importance(&calm_ctx), 1.0);
        // Match point, trailing on rounds, and a side two hands into the round.
        let tense_importance = ModerateStrategy::<StdRng>::round_importance(&tense_ctx);
        assert!((tense_importance - 1.8).abs() < 1e-6);
    }
}
