use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use celestial_bot::{BotDifficulty, spawn_strategy};
use celestial_core::game::snapshot::HandSummary;
use celestial_core::game::strategy::{DecisionContext, EnemyStrategy, Personality};
use celestial_core::model::card::Card;
use celestial_core::model::player::Side;

use super::{AgentError, DecisionSummary};
use crate::config::{AgentConfig, AgentKind};

pub(super) struct AgentBlueprint {
    pub(super) name: String,
    difficulty: BotDifficulty,
}

impl AgentBlueprint {
    pub(super) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let difficulty = match config.kind {
            AgentKind::Heuristic => heuristic_difficulty(&config.name, &config.params)?,
        };
        Ok(Self {
            name: config.name.clone(),
            difficulty,
        })
    }

    pub(super) fn difficulty(&self) -> BotDifficulty {
        self.difficulty
    }

    pub(super) fn spawn(&self, seed: u64, metrics: SharedMetrics) -> TimedStrategy {
        TimedStrategy {
            inner: spawn_strategy(self.difficulty, Some(seed)),
            metrics,
        }
    }
}

fn heuristic_difficulty(
    name: &str,
    params: &serde_yaml::Value,
) -> Result<BotDifficulty, AgentError> {
    if params.is_null() {
        return Ok(BotDifficulty::default());
    }

    let mapping = params
        .as_mapping()
        .ok_or_else(|| AgentError::InvalidHeuristicParam {
            name: name.to_string(),
            message: "expected mapping for heuristic params".to_string(),
        })?;

    let Some(value) = mapping
        .iter()
        .find_map(|(key, value)| (key.as_str() == Some("difficulty")).then_some(value))
    else {
        return Ok(BotDifficulty::default());
    };

    let text = value
        .as_str()
        .ok_or_else(|| AgentError::InvalidHeuristicParam {
            name: name.to_string(),
            message: "difficulty must be a string".to_string(),
        })?;

    BotDifficulty::parse(text).ok_or_else(|| AgentError::InvalidHeuristicParam {
        name: name.to_string(),
        message: format!("unknown difficulty '{text}'"),
    })
}

pub(super) type SharedMetrics = Arc<Mutex<DecisionMetrics>>;

#[derive(Default)]
pub(super) struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    pub(super) fn summary(&self) -> DecisionSummary {
        let total_ms = self.total.as_secs_f64() * 1000.0;
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            total_ms / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms,
        }
    }
}

/// Forwards to a strategy and records how long each decision took. The
/// metrics handle is shared because the enemy seat's strategy is owned by
/// the game.
pub(super) struct TimedStrategy {
    inner: Box<dyn EnemyStrategy>,
    metrics: SharedMetrics,
}

impl TimedStrategy {
    fn timed<T>(&mut self, decide: impl FnOnce(&mut dyn EnemyStrategy) -> T) -> T {
        let start = Instant::now();
        let result = decide(self.inner.as_mut());
        let elapsed = start.elapsed();
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(elapsed);
        result
    }
}

impl EnemyStrategy for TimedStrategy {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn personality(&self) -> Personality {
        self.inner.personality()
    }

    fn select_first_card(&mut self, hand: &[Card], ctx: &DecisionContext<'_>) -> Card {
        self.timed(|inner| inner.select_first_card(hand, ctx))
    }

    fn select_second_card(
        &mut self,
        hand: &[Card],
        first: Card,
        ctx: &DecisionContext<'_>,
    ) -> Card {
        self.timed(|inner| inner.select_second_card(hand, first, ctx))
    }

    fn should_use_banked_power(&mut self, ctx: &DecisionContext<'_>) -> bool {
        self.timed(|inner| inner.should_use_banked_power(ctx))
    }

    fn observe_hand(&mut self, side: Side, summary: &HandSummary) {
        self.inner.observe_hand(side, summary);
    }
}
