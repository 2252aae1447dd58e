mod hard;
mod memory;
mod moderate;
mod params;
mod scoring;

pub use hard::{HardStrategy, RoundStakes};
pub use memory::CardMemory;
pub use moderate::ModerateStrategy;
pub use params::BotParams;

use celestial_core::game::strategy::DecisionContext;
use celestial_core::model::card::Card;
use celestial_core::model::combination::CardCombination;
use celestial_core::model::suit::Suit;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    #[default]
    Moderate,
    Hard,
}

impl BotDifficulty {
    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| match std::env::var("CEL_BOT_DIFFICULTY") {
            Ok(raw) => Self::parse(&raw).unwrap_or_default(),
            Err(_) => BotDifficulty::default(),
        })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "moderate" | "normal" | "default" => Some(BotDifficulty::Moderate),
            "hard" => Some(BotDifficulty::Hard),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BotDifficulty::Moderate => "moderate",
            BotDifficulty::Hard => "hard",
        }
    }

    pub fn params(self) -> BotParams {
        match self {
            BotDifficulty::Moderate => BotParams::moderate(),
            BotDifficulty::Hard => BotParams::hard(),
        }
    }
}

/// Behind on rounds, hands or points in the open hand.
pub(crate) fn should_play_aggressive(ctx: &DecisionContext<'_>) -> bool {
    ctx.opponent_rounds_won() > ctx.own_rounds_won()
        || ctx.opponent_hands_won() > ctx.own_hands_won()
        || ctx.hand_point_gap() < 0
}

/// Most the opponent can still reach this hand: points already scored, the
/// best immediate points any second card could add to its face-up card, and
/// its bank if it can still be withdrawn.
pub(crate) fn opponent_ceiling(ctx: &DecisionContext<'_>) -> Option<u32> {
    let first = ctx.opponent_face_up()?;
    let best_second = Suit::ALL
        .iter()
        .filter_map(|&suit| Card::try_new(suit, Card::MAX_VALUE))
        .map(|second| CardCombination::new(first, second).immediate_points())
        .max()
        .unwrap_or(0);
    let used = ctx.score().banked_used_this_hand(ctx.side().opponent());
    let reserve = if ctx.opponent().is_banked_power_locked() || used > 0 {
        0
    } else {
        ctx.opponent_banked()
    };
    Some(used + best_second.max(ctx.score().card_points(ctx.side().opponent())) + reserve)
}

/// Spending the bank now guarantees the hand. Own card points only ever grow
/// once a first card is down, so the current total is a floor.
pub(crate) fn wins_outright(ctx: &DecisionContext<'_>) -> bool {
    let banked = ctx.own_banked();
    if banked == 0 {
        return false;
    }
    match opponent_ceiling(ctx) {
        Some(ceiling) => ctx.own_hand_points() + banked > ceiling,
        None => false,
    }
}

/// Chance of spending when no override fires: aggressiveness scaled by bank
/// size and round importance, capped.
pub(crate) fn spend_probability(params: &BotParams, banked: u32, importance: f32) -> f64 {
    let bank_scale = (banked as f32 / 10.0).min(1.5);
    let raw = params.personality.aggressiveness * bank_scale * importance;
    f64::from(raw.clamp(0.0, params.spend_probability_cap))
}
