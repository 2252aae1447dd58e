mod agent;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use celestial_bot::play_player_hand;
use celestial_core::game::snapshot::GameSnapshot;
use celestial_core::game::state::GameState;
use celestial_core::model::player::Side;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;

use agent::{AgentBlueprint, SharedMetrics};

/// Mixed into the match seed so the two seats never share a generator.
const SEAT_SALT: [u64; 2] = [0x5eed_0000_0000_0001, 0x5eed_0000_0000_0002];

/// Plays seeded matches between two configured agents.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub seatings: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        if agents.len() != 2 {
            return Err(RunnerError::AgentCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Seat orders played for every seed: agent indices for the player and
    /// enemy sides.
    fn seatings(&self) -> Vec<[usize; 2]> {
        if self.config.matches.swap_sides {
            vec![[0, 1], [1, 0]]
        } else {
            vec![[0, 1]]
        }
    }

    /// Execute every match, streaming one JSONL row per match to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let seatings = self.seatings();
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for match_index in 0..self.config.matches.count {
            let match_seed = rng.next_u64();

            for (seating_index, seating) in seatings.iter().enumerate() {
                let outcome = self.play_match(match_index, seating_index, match_seed, seating)?;
                analytics.record_match(&outcome)?;
                write_match_row(&mut writer, &self.config.run_id, &outcome)?;
                rows_written += 1;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match self.outputs.plots_dir.as_ref() {
            Some(dir) => match summary.render_plot(dir) {
                Ok(path) => Some(path),
                Err(err) => {
                    eprintln!("WARN: {}", err);
                    None
                }
            },
            None => None,
        };

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.report_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            matches_played: self.config.matches.count,
            seatings: seatings.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            telemetry_path,
        })
    }

    fn play_match(
        &self,
        match_index: usize,
        seating_index: usize,
        match_seed: u64,
        seating: &[usize; 2],
    ) -> Result<MatchOutcome, RunnerError> {
        let metrics = [SharedMetrics::default(), SharedMetrics::default()];
        let seat_agent = |side: Side| &self.agents[seating[side.index()]];

        let mut player = seat_agent(Side::Player).spawn(
            match_seed ^ SEAT_SALT[Side::Player.index()],
            Arc::clone(&metrics[Side::Player.index()]),
        );
        let enemy = seat_agent(Side::Enemy).spawn(
            match_seed ^ SEAT_SALT[Side::Enemy.index()],
            Arc::clone(&metrics[Side::Enemy.index()]),
        );
        let mut state = GameState::with_seed(match_seed, Box::new(enemy));
        let limit = self.config.limits.max_hands_per_match;

        while !state.is_match_complete() {
            if state.hands_played() >= limit {
                return Err(RunnerError::HandLimit { match_index, limit });
            }
            if !play_player_hand(&mut state, &mut player) {
                return Err(RunnerError::game(format!(
                    "hand {} of match {match_index} was refused (phase: {:?})",
                    state.hands_played() + 1,
                    state.phase()
                )));
            }

            if self.logging_enabled
                && tracing::enabled!(target: "celestial_bench::hand", Level::INFO)
                && let Some(hand) = state.last_hand()
            {
                event!(
                    target: "celestial_bench::hand",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    match_index = match_index as u32,
                    seating_index = seating_index as u32,
                    hand = hand.hand_number,
                    round = hand.round as u32,
                    player_points = hand.player.hand_points,
                    enemy_points = hand.enemy.hand_points,
                    winner = ?hand.winner,
                );
            }
        }

        let score = state.score_state();
        let seats = Side::BOTH.map(|side| SeatResult {
            agent_name: seat_agent(side).name.clone(),
            difficulty: seat_agent(side).difficulty().label().to_string(),
            side,
            rounds_won: score.rounds_won(side),
            hands_won: score
                .round_history()
                .iter()
                .map(|tally| u32::from(tally.hands(side)))
                .sum(),
            metrics: metrics[side.index()]
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .summary(),
        });
        let winner = state
            .match_winner()
            .map(|side| seats[side.index()].agent_name.clone());

        if self.logging_enabled {
            event!(
                target: "celestial_bench::match",
                Level::INFO,
                run_id = %self.config.run_id,
                match_index = match_index as u32,
                seating_index = seating_index as u32,
                hands = state.hands_played(),
                winner = winner.as_deref().unwrap_or("none"),
            );
        }

        Ok(MatchOutcome {
            match_index,
            seating_index,
            seed: match_seed,
            hands_played: state.hands_played(),
            seats,
            winner,
            snapshot: state.snapshot(),
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_match_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    outcome: &MatchOutcome,
) -> Result<(), RunnerError> {
    let row = MatchLogRow {
        run_id,
        match_id: format!("M{:05}_S{}", outcome.match_index, outcome.seating_index),
        match_index: outcome.match_index,
        seating_index: outcome.seating_index,
        match_seed: outcome.seed,
        winner: outcome.winner.as_deref(),
        hands_played: outcome.hands_played,
        seats: outcome
            .seats
            .iter()
            .map(|seat| SeatRow {
                side: seat.side,
                bot: &seat.agent_name,
                difficulty: &seat.difficulty,
                rounds_won: seat.rounds_won,
                hands_won: seat.hands_won,
                decisions: seat.metrics.decisions,
                speed_ms_decision: seat.metrics.avg_ms_per_decision,
            })
            .collect(),
        snapshot: &outcome.snapshot,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Result of one finished match.
pub struct MatchOutcome {
    pub match_index: usize,
    pub seating_index: usize,
    pub seed: u64,
    pub hands_played: u32,
    /// Indexed by side.
    pub seats: [SeatResult; 2],
    pub winner: Option<String>,
    pub snapshot: GameSnapshot,
}

impl MatchOutcome {
    pub fn seat_of(&self, agent_name: &str) -> Option<&SeatResult> {
        self.seats.iter().find(|seat| seat.agent_name == agent_name)
    }
}

pub struct SeatResult {
    pub agent_name: String,
    pub difficulty: String,
    pub side: Side,
    pub rounds_won: u8,
    pub hands_won: u32,
    pub metrics: DecisionSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct MatchLogRow<'a> {
    run_id: &'a str,
    match_id: String,
    match_index: usize,
    seating_index: usize,
    match_seed: u64,
    winner: Option<&'a str>,
    hands_played: u32,
    seats: Vec<SeatRow<'a>>,
    snapshot: &'a GameSnapshot,
}

#[derive(Serialize)]
struct SeatRow<'a> {
    side: Side,
    bot: &'a str,
    difficulty: &'a str,
    rounds_won: u8,
    hands_won: u32,
    decisions: u32,
    speed_ms_decision: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires exactly 2 agents but found {found}")]
    AgentCount { found: usize },
    #[error("match {match_index} did not finish within {limit} hands")]
    HandLimit { match_index: usize, limit: u32 },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid heuristic parameter for agent '{name}': {message}")]
    InvalidHeuristicParam { name: String, message: String },
}
