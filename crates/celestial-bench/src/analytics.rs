use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use celestial_core::model::player::Side;
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::tournament::{DecisionSummary, MatchOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

const COLUMNS: [&str; 10] = [
    "Agent",
    "Matches",
    "Wins",
    "Win %",
    "95% CI",
    "Win % as player",
    "Rounds won",
    "Hands won",
    "Avg hands/match",
    "Avg ms/decision",
];

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    matches: usize,
    player_side_wins: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(agent.name.clone(), AgentAccumulator::new(agent.name.clone()));
            order.push(agent.name.clone());
        }

        Self {
            agents,
            agent_order: order,
            matches: 0,
            player_side_wins: 0,
        }
    }

    pub fn record_match(&mut self, outcome: &MatchOutcome) -> Result<(), AnalyticsError> {
        for seat in &outcome.seats {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.record_match(
                outcome.winner.as_deref() == Some(seat.agent_name.as_str()),
                seat.side,
                seat.rounds_won,
                seat.hands_won,
                outcome.hands_played,
                &seat.metrics,
            );
        }

        self.matches += 1;
        let player_name = &outcome.seats[Side::Player.index()].agent_name;
        if outcome.winner.as_ref() == Some(player_name) {
            self.player_side_wins += 1;
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let agents: Vec<AgentReport> = self
            .agent_order
            .iter()
            .filter_map(|name| self.agents.remove(name))
            .map(AgentAccumulator::into_report)
            .collect();

        let head_to_head = agents.first().map(|first| {
            let decided = agents.iter().map(|agent| agent.wins).sum::<usize>();
            HeadToHead {
                agent: first.name.clone(),
                wins: first.wins,
                decided,
                p_value: two_sided_p_value(first.wins, decided),
            }
        });

        AnalyticsSummary {
            matches: self.matches,
            player_side_win_rate: ratio(self.player_side_wins, self.matches),
            agents,
            head_to_head,
        }
    }
}

struct AgentAccumulator {
    name: String,
    matches: usize,
    wins: usize,
    wins_as_player: usize,
    matches_as_player: usize,
    rounds_won: u32,
    hands_won: u32,
    hands_played: u64,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String) -> Self {
        Self {
            name,
            matches: 0,
            wins: 0,
            wins_as_player: 0,
            matches_as_player: 0,
            rounds_won: 0,
            hands_won: 0,
            hands_played: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_match(
        &mut self,
        won: bool,
        side: Side,
        rounds_won: u8,
        hands_won: u32,
        hands_played: u32,
        metrics: &DecisionSummary,
    ) {
        self.matches += 1;
        if won {
            self.wins += 1;
        }
        if side == Side::Player {
            self.matches_as_player += 1;
            if won {
                self.wins_as_player += 1;
            }
        }
        self.rounds_won += u32::from(rounds_won);
        self.hands_won += hands_won;
        self.hands_played += u64::from(hands_played);
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let win_rate = ratio(self.wins, self.matches);
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };
        let avg_hands = if self.matches == 0 {
            0.0
        } else {
            self.hands_played as f64 / self.matches as f64
        };

        AgentReport {
            ci95: win_rate_interval(self.wins, self.matches),
            name: self.name,
            matches: self.matches,
            wins: self.wins,
            win_rate,
            win_rate_as_player: ratio(self.wins_as_player, self.matches_as_player),
            rounds_won: self.rounds_won,
            hands_won: self.hands_won,
            avg_hands_per_match: avg_hands,
            average_ms_per_decision: avg_latency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub matches: usize,
    pub player_side_win_rate: f64,
    pub agents: Vec<AgentReport>,
    pub head_to_head: Option<HeadToHead>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Self-Play Summary\n\n");
        rows.push_str(&format!(
            "Matches: {} | Player-side win rate: {:.1}%\n\n",
            self.matches,
            self.player_side_win_rate * 100.0
        ));
        rows.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
        let rule: Vec<String> = COLUMNS.iter().map(|c| "-".repeat(c.len())).collect();
        rows.push_str(&format!("|-{}-|\n", rule.join("-|-")));

        for agent in &self.agents {
            rows.push_str(&format!(
                concat!(
                    "| {name} | {matches} | {wins} | {win:.1}% | [{ci_low:.3}, {ci_high:.3}] ",
                    "| {as_player:.1}% | {rounds} | {hands} | {avg_hands:.1} | {latency:.3} |\n",
                ),
                name = agent.name,
                matches = agent.matches,
                wins = agent.wins,
                win = agent.win_rate * 100.0,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                as_player = agent.win_rate_as_player * 100.0,
                rounds = agent.rounds_won,
                hands = agent.hands_won,
                avg_hands = agent.avg_hands_per_match,
                latency = agent.average_ms_per_decision,
            ));
        }

        if let Some(h2h) = &self.head_to_head {
            rows.push_str(&format!(
                concat!(
                    "\nHead-to-head: {} won {} of {} decided matches ",
                    "(p = {:.3} against an even split)\n",
                ),
                h2h.agent, h2h.wins, h2h.decided, h2h.p_value
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("win_rate.png");
        let agents = self.agents.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Match win rate with 95% CI", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(0..agents.len(), 0.0f64..1.0f64)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Win rate")
                .x_desc("Agent")
                .x_label_formatter(&|idx| {
                    agents
                        .get(*idx)
                        .map(|agent| agent.name.clone())
                        .unwrap_or_default()
                })
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(agents.iter().enumerate().map(|(idx, agent)| {
                    let color = if agent.win_rate >= 0.5 { &GREEN } else { &RED };
                    Rectangle::new([(idx, 0.0), (idx + 1, agent.win_rate)], color.filled())
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .draw_series(agents.iter().enumerate().map(|(idx, agent)| {
                    PathElement::new(
                        vec![(idx, agent.ci95.0), (idx, agent.ci95.1)],
                        BLACK.stroke_width(2),
                    )
                }))
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub matches: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub win_rate_as_player: f64,
    pub rounds_won: u32,
    pub hands_won: u32,
    pub avg_hands_per_match: f64,
    pub average_ms_per_decision: f64,
}

/// First configured agent against the field, tested against a fair coin.
#[derive(Debug, Clone, Serialize)]
pub struct HeadToHead {
    pub agent: String,
    pub wins: usize,
    pub decided: usize,
    pub p_value: f64,
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Normal-approximation interval for a win proportion, clamped to [0, 1].
fn win_rate_interval(wins: usize, matches: usize) -> (f64, f64) {
    if matches == 0 {
        return (0.0, 0.0);
    }
    let p = ratio(wins, matches);
    let margin = CONFIDENCE_Z * (p * (1.0 - p) / matches as f64).sqrt();
    ((p - margin).max(0.0), (p + margin).min(1.0))
}

/// Two-sided p-value of `wins` out of `decided` under an even split, with a
/// continuity correction.
fn two_sided_p_value(wins: usize, decided: usize) -> f64 {
    if decided == 0 {
        return 1.0;
    }
    let n = decided as f64;
    let deviation = (wins as f64 - n / 2.0).abs() - 0.5;
    if deviation <= 0.0 {
        return 1.0;
    }
    let z = deviation / (n / 4.0).sqrt();
    match Normal::new(0.0, 1.0) {
        Ok(normal) => (2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::SeatResult;

    fn summary(decisions: u32) -> DecisionSummary {
        DecisionSummary {
            decisions,
            avg_ms_per_decision: 0.5,
            total_ms: 0.5 * f64::from(decisions),
        }
    }

    fn collector() -> AnalyticsCollector {
        let yaml = r#"
run_id: "unit"
matches: { seed: 1, count: 1 }
agents:
  - { name: "a", kind: "heuristic" }
  - { name: "b", kind: "heuristic" }
outputs: { jsonl: "m.jsonl", summary_md: "s.md" }
"#;
        let config: BenchmarkConfig = serde_yaml::from_str(yaml).expect("config");
        AnalyticsCollector::new(&config)
    }

    fn outcome(player: &str, enemy: &str, winner: &str) -> MatchOutcome {
        let seat = |name: &str, side: Side| SeatResult {
            agent_name: name.to_string(),
            difficulty: "moderate".to_string(),
            side,
            rounds_won: if name == winner { 3 } else { 1 },
            hands_won: if name == winner { 9 } else { 5 },
            metrics: summary(20),
        };
        let state = celestial_core::game::state::GameState::with_seed(
            1,
            celestial_bot::spawn_strategy(celestial_bot::BotDifficulty::Moderate, Some(1)),
        );
        MatchOutcome {
            match_index: 0,
            seating_index: 0,
            seed: 1,
            hands_played: 14,
            seats: [seat(player, Side::Player), seat(enemy, Side::Enemy)],
            winner: Some(winner.to_string()),
            snapshot: state.snapshot(),
        }
    }

    #[test]
    fn win_rate_interval_is_clamped() {
        assert_eq!(win_rate_interval(0, 0), (0.0, 0.0));
        assert_eq!(win_rate_interval(5, 5), (1.0, 1.0));
        let (low, high) = win_rate_interval(5, 10);
        assert!(low > 0.18 && low < 0.2);
        assert!(high > 0.8 && high < 0.82);
    }

    #[test]
    fn even_split_is_not_significant() {
        assert_eq!(two_sided_p_value(5, 10), 1.0);
        assert_eq!(two_sided_p_value(0, 0), 1.0);
        let lopsided = two_sided_p_value(90, 100);
        assert!(lopsided < 1e-6);
        assert!((two_sided_p_value(10, 100) - lopsided).abs() < 1e-12);
    }

    #[test]
    fn records_wins_by_side() {
        let mut collector = collector();
        collector.record_match(&outcome("a", "b", "a")).expect("first");
        collector.record_match(&outcome("b", "a", "a")).expect("second");
        let summary = collector.finalize();

        assert_eq!(summary.matches, 2);
        assert_eq!(summary.player_side_win_rate, 0.5);
        let a = &summary.agents[0];
        assert_eq!((a.name.as_str(), a.wins, a.matches), ("a", 2, 2));
        assert_eq!(a.win_rate_as_player, 1.0);
        assert_eq!(a.rounds_won, 6);
        assert_eq!(a.avg_hands_per_match, 14.0);
        assert_eq!(a.average_ms_per_decision, 0.5);
        let h2h = summary.head_to_head.as_ref().expect("head to head");
        assert_eq!((h2h.wins, h2h.decided), (2, 2));
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let mut collector = collector();
        let err = collector
            .record_match(&outcome("a", "zed", "a"))
            .expect_err("unknown");
        assert!(matches!(err, AnalyticsError::UnknownAgent(name) if name == "zed"));
    }

    #[test]
    fn markdown_lists_every_agent() {
        let mut collector = collector();
        collector.record_match(&outcome("a", "b", "b")).expect("record");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("summary.md");
        collector.finalize().write_markdown(&path).expect("write");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.starts_with("# Self-Play Summary"));
        assert!(text.contains("| a | 1 | 0 |"));
        assert!(text.contains("| b | 1 | 1 |"));
        assert!(text.contains("Head-to-head: a won 0 of 1"));
    }
}
