use celestial_core::game::strategy::Personality;

/// Tuning knobs shared by both heuristic strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    pub personality: Personality,
    /// Symmetric multiplicative noise applied to card scores; zero disables it.
    pub jitter: f32,
    pub aggressive_dawn_mult: f32,
    pub dawn_pair_mult: f32,
    pub night_pair_mult: f32,
    pub dusk_vs_bank_mult: f32,
    pub dusk_idle_mult: f32,
    pub bank_weight: f32,
    pub cancel_weight: f32,
    /// Applied once per consecutive Night opening.
    pub night_lead_repeat_penalty: f32,
    /// Weight of deck composition when choosing which suit to spend.
    pub draw_bias: f32,
    pub gap_override: u32,
    pub match_point_min_bank: u32,
    /// Below this bank, an open round keeps its power.
    pub save_threshold: u32,
    pub spend_probability_cap: f32,
}

impl BotParams {
    pub const fn moderate() -> Self {
        Self {
            personality: Personality::new(0.5, 0.5, 0.6),
            jitter: 0.05,
            aggressive_dawn_mult: 1.3,
            dawn_pair_mult: 1.0,
            night_pair_mult: 1.3,
            dusk_vs_bank_mult: 1.25,
            dusk_idle_mult: 0.8,
            bank_weight: 0.7,
            cancel_weight: 0.9,
            night_lead_repeat_penalty: 1.0,
            draw_bias: 0.0,
            gap_override: 10,
            match_point_min_bank: 5,
            save_threshold: 0,
            spend_probability_cap: 0.9,
        }
    }

    pub const fn hard() -> Self {
        Self {
            personality: Personality::new(0.6, 0.7, 0.7),
            jitter: 0.05,
            aggressive_dawn_mult: 1.4,
            dawn_pair_mult: 1.35,
            night_pair_mult: 1.6,
            dusk_vs_bank_mult: 1.4,
            dusk_idle_mult: 0.7,
            bank_weight: 0.8,
            cancel_weight: 1.1,
            night_lead_repeat_penalty: 0.85,
            draw_bias: 0.25,
            gap_override: 8,
            match_point_min_bank: 5,
            save_threshold: 6,
            spend_probability_cap: 0.9,
        }
    }

    pub const fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }
}

impl Default for BotParams {
    fn default() -> Self {
        Self::moderate()
    }
}
