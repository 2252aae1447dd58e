use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_MAX_HANDS_PER_MATCH: u32 = 400;
const REQUIRED_AGENTS: usize = 2;

/// Root self-play configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub matches: MatchConfig,
    pub agents: Vec<AgentConfig>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load and validate a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| ConfigError::Read {
            source,
            path: path.clone(),
        })?;
        let mut cfg: BenchmarkConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|source| ConfigError::Parse {
                source,
                path: path.clone(),
            })?;
        cfg.validate()
            .map_err(|source| ConfigError::Invalid { path, source })?;
        Ok(cfg)
    }

    /// Checks every field that would otherwise fail mid-run. CLI overrides
    /// are applied before calling this again.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        // The run id lands in output paths.
        let path_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
        if self.run_id.is_empty() || !self.run_id.chars().all(path_safe) {
            return Err(invalid(
                "run_id",
                "run_id must be non-empty and use only alphanumerics, '.', '_' or '-'",
            ));
        }
        if self.matches.count == 0 {
            return Err(invalid("matches.count", "at least one match is required"));
        }
        if self.limits.max_hands_per_match == 0 {
            return Err(invalid(
                "limits.max_hands_per_match",
                "hand limit must be greater than zero",
            ));
        }
        self.outputs.validate()?;

        if self.agents.len() != REQUIRED_AGENTS {
            return Err(invalid(
                "agents",
                format!(
                    "exactly {REQUIRED_AGENTS} agents are required but {} were given",
                    self.agents.len()
                ),
            ));
        }
        let [first, second] = [&self.agents[0].name, &self.agents[1].name];
        if first.trim().is_empty() || second.trim().is_empty() {
            return Err(invalid("agents.name", "agent name must not be empty"));
        }
        if first == second {
            return Err(invalid(
                "agents",
                format!("agent name '{first}' defined more than once"),
            ));
        }
        Ok(())
    }

    /// Resolve `{run_id}` placeholders into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        let resolve = |template: &str| PathBuf::from(template.replace("{run_id}", &self.run_id));
        ResolvedOutputs {
            jsonl: resolve(&self.outputs.jsonl),
            summary_md: resolve(&self.outputs.summary_md),
            plots_dir: self.outputs.plots_dir.as_deref().map(resolve),
        }
    }
}

/// How many seeded matches to play.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub seed: Option<u64>,
    pub count: usize,
    /// Replay every seed with the agents in each other's seats.
    #[serde(default = "default_swap_sides")]
    pub swap_sides: bool,
}

fn default_swap_sides() -> bool {
    true
}

/// One self-play participant. Heuristic params accept `difficulty`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Heuristic,
}

/// Output templates; `{run_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
    #[serde(default)]
    pub plots_dir: Option<String>,
}

impl OutputsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        let entries = [
            ("outputs.jsonl", Some(&self.jsonl)),
            ("outputs.summary_md", Some(&self.summary_md)),
            ("outputs.plots_dir", self.plots_dir.as_ref()),
        ];
        for (field, value) in entries {
            if value.is_some_and(|path| path.trim().is_empty()) {
                return Err(invalid(field, "path must not be empty"));
            }
        }
        Ok(())
    }
}

/// Guards against matches that never finish.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_max_hands_per_match")]
    pub max_hands_per_match: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_hands_per_match: DEFAULT_MAX_HANDS_PER_MATCH,
        }
    }
}

fn default_max_hands_per_match() -> u32 {
    DEFAULT_MAX_HANDS_PER_MATCH
}

/// Structured logging is off unless asked for.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default)]
    pub tracing_level: Option<String>,
}

impl LoggingConfig {
    /// Configured level, or `None` when unset or unrecognised.
    pub fn level(&self) -> Option<Level> {
        self.tracing_level.as_deref()?.trim().parse().ok()
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
    pub plots_dir: Option<PathBuf>,
}

impl ResolvedOutputs {
    /// Directory that holds the summary and, when enabled, the telemetry log.
    pub fn report_dir(&self) -> PathBuf {
        self.summary_md
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: &str = r#"
run_id: "nightly"
matches: { seed: 123, count: 8 }
agents:
  - { name: "moderate", kind: "heuristic", params: { difficulty: "moderate" } }
  - { name: "hard", kind: "heuristic", params: { difficulty: "hard" } }
outputs:
  jsonl: "bench/out/{run_id}/matches.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging: { enable_structured: true, tracing_level: "DEBUG" }
"#;

    fn rejected_field(yaml: &str) -> String {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(yaml).expect("parse yaml");
        match cfg.validate() {
            Err(ValidationError::InvalidField { field, .. }) => field,
            Ok(()) => panic!("config should have been rejected"),
        }
    }

    #[test]
    fn defaults_fill_optional_sections() {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(RUN).expect("parse yaml");
        cfg.validate().expect("validate");

        assert!(cfg.matches.swap_sides);
        assert_eq!(cfg.limits, LimitsConfig::default());
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));

        let outputs = cfg.resolved_outputs();
        assert_eq!(outputs.jsonl, PathBuf::from("bench/out/nightly/matches.jsonl"));
        assert_eq!(outputs.plots_dir, None);
        assert_eq!(outputs.report_dir(), PathBuf::from("bench/out/nightly"));
    }

    #[test]
    fn unknown_or_missing_level_is_none() {
        assert_eq!(LoggingConfig::default().level(), None);
        let logging = LoggingConfig {
            enable_structured: true,
            tracing_level: Some("loud".to_string()),
        };
        assert_eq!(logging.level(), None);
    }

    #[test]
    fn each_bad_field_is_named() {
        let one_agent = RUN.replace(
            "  - { name: \"hard\", kind: \"heuristic\", params: { difficulty: \"hard\" } }\n",
            "",
        );
        assert_eq!(rejected_field(&one_agent), "agents");
        let duplicate = RUN.replace("\"hard\", kind", "\"moderate\", kind");
        assert_eq!(rejected_field(&duplicate), "agents");
        assert_eq!(rejected_field(&RUN.replace("nightly", "night ly")), "run_id");
        assert_eq!(rejected_field(&RUN.replace("count: 8", "count: 0")), "matches.count");
        let no_hands = format!("{RUN}limits: {{ max_hands_per_match: 0 }}\n");
        assert_eq!(rejected_field(&no_hands), "limits.max_hands_per_match");
        let blank_plots = RUN.replace(
            "  summary_md: \"bench/out/{run_id}/summary.md\"\n",
            "  summary_md: \"bench/out/{run_id}/summary.md\"\n  plots_dir: \" \"\n",
        );
        assert_eq!(rejected_field(&blank_plots), "outputs.plots_dir");
    }

    #[test]
    fn run_id_is_substituted_everywhere() {
        let yaml = RUN.replace("{run_id}/summary.md", "{run_id}/{run_id}.md");
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(
            cfg.resolved_outputs().summary_md,
            PathBuf::from("bench/out/nightly/nightly.md")
        );
    }
}
