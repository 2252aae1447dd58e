use crate::bot::{BotDifficulty, HardStrategy, ModerateStrategy};
use celestial_core::game::state::GameState;
use celestial_core::game::strategy::{DecisionContext, EnemyStrategy};
use celestial_core::model::card::Card;
use celestial_core::model::player::Side;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

/// Builds a fresh strategy for one match. Without a seed the generator is
/// seeded from the operating system.
pub fn spawn_strategy(difficulty: BotDifficulty, seed: Option<u64>) -> Box<dyn EnemyStrategy> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let params = difficulty.params();
    match difficulty {
        BotDifficulty::Moderate => Box::new(ModerateStrategy::with_rng(params, rng)),
        BotDifficulty::Hard => Box::new(HardStrategy::with_rng(params, rng)),
    }
}

/// Strategy for the difficulty named in `CEL_BOT_DIFFICULTY`.
pub fn spawn_from_env(seed: Option<u64>) -> Box<dyn EnemyStrategy> {
    spawn_strategy(BotDifficulty::from_env(), seed)
}

/// Plays one hand with `strategy` in the player's seat, going through the
/// same entry points a human would. Returns `false` once the match is over
/// or if the engine refused a card.
pub fn play_player_hand(state: &mut GameState, strategy: &mut dyn EnemyStrategy) -> bool {
    if !state.open_next_hand() {
        return false;
    }
    let first = {
        let ctx = state.decision_context(Side::Player);
        strategy.select_first_card(state.player().hand().cards(), &ctx)
    };
    if state.process_first_cards(first).is_none() {
        return false;
    }

    let spend = {
        let ctx = state.decision_context(Side::Player);
        ctx.can_withdraw() && strategy.should_use_banked_power(&ctx)
    };
    if spend {
        state.use_banked_power(Side::Player);
    }

    let second = {
        let ctx = state.decision_context(Side::Player);
        strategy.select_second_card(state.player().hand().cards(), first, &ctx)
    };
    if state.process_second_cards(second).is_none() {
        return false;
    }
    if let Some(summary) = state.last_hand() {
        strategy.observe_hand(Side::Player, summary);
    }
    true
}

pub(crate) fn log_card_decision(
    strategy: &str,
    ctx: &DecisionContext<'_>,
    stage: &'static str,
    candidates: usize,
    chosen: Card,
    score: f32,
    importance: f32,
) {
    if !tracing::enabled!(target: "celestial_bot::decision", Level::DEBUG) {
        return;
    }
    event!(
        target: "celestial_bot::decision",
        Level::DEBUG,
        strategy,
        side = %ctx.side(),
        stage,
        candidates,
        chosen = %chosen,
        score = f64::from(score),
        importance = f64::from(importance),
        hands_won = ctx.own_hands_won(),
        rounds_won = ctx.own_rounds_won(),
    );
}

pub(crate) fn log_bank_decision(
    strategy: &str,
    ctx: &DecisionContext<'_>,
    banked: u32,
    spend: bool,
    reason: &'static str,
) {
    event!(
        target: "celestial_bot::decision",
        Level::DEBUG,
        strategy,
        side = %ctx.side(),
        banked,
        spend,
        reason,
        gap = ctx.hand_point_gap(),
        "banked power verdict"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use celestial_core::game::state::GameState;

    #[test]
    fn spawned_strategies_carry_difficulty_names() {
        assert_eq!(spawn_strategy(BotDifficulty::Moderate, Some(1)).name(), "moderate");
        assert_eq!(spawn_strategy(BotDifficulty::Hard, None).name(), "hard");
        let hard = spawn_strategy(BotDifficulty::Hard, Some(2)).personality();
        assert_eq!(hard.aggressiveness, 0.7);
    }

    #[test]
    fn seeded_strategies_replay_identically() {
        let play = |seed: u64| {
            let enemy = spawn_strategy(BotDifficulty::Hard, Some(seed));
            let mut state = GameState::with_seed(11, enemy);
            let mut enemy_cards = Vec::new();
            for _ in 0..5 {
                let first = state.player().hand().cards()[0];
                enemy_cards.extend(state.process_first_cards(first));
                let second = state.player().hand().cards()[0];
                enemy_cards.extend(state.process_second_cards(second));
            }
            enemy_cards
        };
        assert_eq!(play(5), play(5));
    }

    #[test]
    fn strategy_can_take_the_player_seat() {
        let mut state = GameState::with_seed(3, spawn_strategy(BotDifficulty::Moderate, Some(1)));
        let mut seat = spawn_strategy(BotDifficulty::Hard, Some(2));
        assert!(play_player_hand(&mut state, seat.as_mut()));
        assert_eq!(state.hands_played(), 1);
        assert_eq!(state.player().hand().len(), 10);
    }
}
