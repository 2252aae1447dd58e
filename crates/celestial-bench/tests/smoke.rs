use std::fs;
use std::path::Path;

use celestial_bench::config::BenchmarkConfig;
use celestial_bench::tournament::{RunSummary, TournamentRunner};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

fn load_config(output_dir: &Path) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
matches:
  seed: 4242
  count: 3
agents:
  - name: "moderate"
    kind: "heuristic"
    params:
      difficulty: "moderate"
  - name: "hard"
    kind: "heuristic"
    params:
      difficulty: "hard"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
  plots_dir: "{plots}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("matches.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
        plots = output_dir.join("plots").display()
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run_in(dir: &Path) -> RunSummary {
    let config = load_config(dir);
    let outputs = config.resolved_outputs();
    let runner = TournamentRunner::new(config, outputs).expect("runner created");
    runner.run().expect("self-play completes")
}

/// Hash of the JSONL rows with wall-clock timings zeroed.
fn normalized_digest(path: &Path) -> (String, Vec<serde_json::Value>) {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    let mut rows = Vec::new();
    let mut normalized = String::new();
    for line in jsonl.lines() {
        let mut value: serde_json::Value = serde_json::from_str(line).expect("row decodes to JSON");
        if let Some(seats) = value.get_mut("seats").and_then(|s| s.as_array_mut()) {
            for seat in seats {
                if let Some(speed) = seat.get_mut("speed_ms_decision") {
                    *speed = serde_json::Value::from(0.0);
                }
            }
        }
        normalized.push_str(&serde_json::to_string(&value).expect("re-serialize normalized row"));
        normalized.push('\n');
        rows.push(value);
    }

    let digest = Sha256::digest(normalized.as_bytes());
    (hex::encode(digest), rows)
}

#[test]
fn self_play_smoke_test_is_reproducible() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");
    let first = run_in(first_dir.path());
    let second = run_in(second_dir.path());

    assert_eq!(first.matches_played, 3);
    assert_eq!(first.seatings, 2);
    assert_eq!(first.rows_written, 6);
    assert!(first.telemetry_path.is_none());

    let (first_hash, rows) = normalized_digest(&first.jsonl_path);
    let (second_hash, _) = normalized_digest(&second.jsonl_path);
    assert_eq!(first_hash, second_hash, "same seed must replay the same matches");
    assert_eq!(rows.len(), 6);

    for row in &rows {
        let winner = row["winner"].as_str().expect("every match has a winner");
        assert!(winner == "moderate" || winner == "hard");
        assert_eq!(row["snapshot"]["match_complete"], serde_json::Value::Bool(true));
        let seats = row["seats"].as_array().expect("seats");
        assert_eq!(seats.len(), 2);
        assert_eq!(seats[0]["side"], "player");
        assert_eq!(seats[1]["side"], "enemy");
    }
    // Swapped seatings share a seed but not a seat order.
    assert_eq!(rows[0]["match_seed"], rows[1]["match_seed"]);
    assert_eq!(rows[0]["seats"][0]["bot"], rows[1]["seats"][1]["bot"]);

    let summary = fs::read_to_string(&first.summary_path).expect("summary markdown");
    assert!(summary.contains("| moderate |"));
    assert!(summary.contains("| hard |"));
    // Plot rendering is optional; ensure any failure surfaces explicitly
    if let Some(plot_path) = first.plot_path {
        assert!(plot_path.exists(), "plot path reported but missing on disk");
    }
}
