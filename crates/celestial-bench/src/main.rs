use std::path::PathBuf;

use clap::Parser;

use celestial_bench::config::{BenchmarkConfig, ResolvedOutputs};
use celestial_bench::logging::init_logging;
use celestial_bench::tournament::TournamentRunner;

/// Self-play harness for the Dawn/Dusk/Night bots.
#[derive(Debug, Parser)]
#[command(
    name = "celestial-bench",
    author,
    version,
    about = "Deterministic self-play harness for celestial bots"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of seeded matches to play.
    #[arg(long, value_name = "MATCHES")]
    matches: Option<usize>,

    /// Override the RNG seed for match generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Play every seed once instead of once per seat order.
    #[arg(long)]
    no_swap: bool,

    /// Exit after validating the configuration (no matches are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    if cli.no_swap {
        config.matches.swap_sides = false;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let matches = config.matches.count;
    let agents = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!("Loaded configuration '{run_id}': {agents} ({matches} matches)");

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: self-play skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Self-play complete for '{run_id}': {} matches × {} seatings → {} rows at {}",
        summary.matches_played,
        summary.seatings,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Win rate plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
