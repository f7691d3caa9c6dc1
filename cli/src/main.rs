//! Command-line driver for `squadron_des::run`: reads a scenario and a state
//! snapshot from disk, optionally an overrides file, and prints the
//! resulting `Results` as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use squadron_des::{Overrides, RandomSource, Scenario, SeededRandomSource, State, ThreadRandomSource};
use tracing::{error, info};

/// Run a squadron discrete-event scheduling scenario.
#[derive(Parser, Debug)]
#[command(name = "squadron-des", version, about)]
struct Cli {
    /// Path to the scenario JSON file.
    scenario: PathBuf,

    /// Path to the state snapshot JSON file.
    state: PathBuf,

    /// Path to an overrides JSON file; omitted entirely if not given.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Fixed RNG seed for reproducible runs; omitted uses OS entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the results JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the results JSON.
    #[arg(long)]
    pretty: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf, what: &str) -> Result<T, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("failed to read {what} file {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("failed to parse {what} JSON in {}: {e}", path.display()))
}

fn run(cli: Cli) -> Result<(), String> {
    let scenario: Scenario = read_json(&cli.scenario, "scenario")?;
    let state: State = read_json(&cli.state, "state")?;
    let overrides: Overrides = match &cli.overrides {
        Some(path) => read_json(path, "overrides")?,
        None => Overrides::default(),
    };

    info!(horizon_hours = scenario.horizon_hours, "running scenario");

    let mut seeded;
    let mut unseeded;
    let rng: &mut dyn RandomSource = match cli.seed {
        Some(seed) => {
            seeded = SeededRandomSource::new(seed);
            &mut seeded
        }
        None => {
            unseeded = ThreadRandomSource::default();
            &mut unseeded
        }
    };

    let results = squadron_des::run(&scenario, &state, &overrides, rng).map_err(|e| e.to_string())?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&results).map_err(|e| format!("failed to serialize results: {e}"))?
    } else {
        serde_json::to_string(&results).map_err(|e| format!("failed to serialize results: {e}"))?
    };

    match &cli.output {
        Some(path) => fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))?,
        None => println!("{json}"),
    }

    info!(
        requested = results.missions.requested,
        started = results.missions.started,
        completed = results.missions.completed,
        rejected = results.missions.rejected,
        "simulation complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
