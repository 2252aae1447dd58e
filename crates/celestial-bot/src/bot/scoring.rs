use super::BotParams;
use celestial_core::game::strategy::DecisionContext;
use celestial_core::model::card::Card;
use celestial_core::model::combination::CardCombination;
use celestial_core::model::hand::count_suit;
use celestial_core::model::suit::Suit;
use rand::Rng;

/// Multiplier drawn uniformly from `1 ± spread`.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    if spread <= 0.0 {
        return 1.0;
    }
    rng.gen_range(1.0 - spread..=1.0 + spread)
}

/// Highest score wins; among equal scores the first candidate is kept.
pub(crate) fn pick_best<I>(scored: I) -> Option<(Card, f32)>
where
    I: IntoIterator<Item = (Card, f32)>,
{
    let mut best: Option<(Card, f32)> = None;
    for (card, score) in scored {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((card, score)),
        }
    }
    best
}

/// Face value shaped by the preference for spending high or low cards.
pub(crate) fn base_value(card: Card, params: &BotParams) -> f32 {
    let preference = params.personality.high_card_preference;
    let value = f32::from(card.value);
    preference * value + (1.0 - preference) * (f32::from(Card::MAX_VALUE) + 1.0 - value) * 0.5
}

/// Suit preference for an opening card: Dawn when behind, pairs that can be
/// completed from hand, Dusk only when there is banked power to cancel.
pub(crate) fn lead_multiplier(
    card: Card,
    hand: &[Card],
    ctx: &DecisionContext<'_>,
    params: &BotParams,
    aggressive: bool,
) -> f32 {
    match card.suit {
        Suit::Dawn => {
            let mut mult = if aggressive { params.aggressive_dawn_mult } else { 1.0 };
            if count_suit(hand, Suit::Dawn) >= 2 {
                mult *= params.dawn_pair_mult;
            }
            mult
        }
        Suit::Dusk if ctx.opponent_banked() > 0 => params.dusk_vs_bank_mult,
        Suit::Dusk => params.dusk_idle_mult,
        Suit::Night if count_suit(hand, Suit::Night) >= 2 => params.night_pair_mult,
        Suit::Night => 1.0,
    }
}

/// Worth of completing `first` with `second`: immediate points at full
/// weight scaled by importance, banked points discounted the more the open
/// hand matters, cancellation valued only up to what the opponent holds.
pub(crate) fn combination_value(
    first: Card,
    second: Card,
    ctx: &DecisionContext<'_>,
    importance: f32,
    params: &BotParams,
) -> f32 {
    let outcome = CardCombination::new(first, second).outcome();
    let opponent_bank = ctx.opponent_banked();
    let effective_cancel = outcome.cancelled.min(opponent_bank) as f32
        + outcome.cancelled.saturating_sub(opponent_bank) as f32 * 0.1;
    let bank_bias = 0.5 + params.personality.banking_probability;

    outcome.immediate as f32 * importance
        + outcome.banked as f32 * params.bank_weight * bank_bias / importance.max(1.0)
        + effective_cancel * params.cancel_weight
}
