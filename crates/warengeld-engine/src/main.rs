//! Engine binary for the Warengeld economy simulation.
//!
//! Loads configuration, seeds the population, runs the tick loop for the
//! configured number of steps, and prints a JSON [`RunReport`] on stdout.
//! Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `warengeld-config.yaml` in the working directory, or defaults
//! 2. Initialize structured logging (tracing), honoring `RUST_LOG` before
//!    the configured level
//! 3. Seed the economy from the population section
//! 4. Run the simulation loop
//! 5. Log the result and print the report
//!
//! [`RunReport`]: crate::report::RunReport

mod error;
mod report;

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;
use warengeld_core::{Economy, SimulationConfig, runner};

use crate::error::EngineError;
use crate::report::{HistoryCallback, RunReport};

const DEFAULT_CONFIG_PATH: &str = "warengeld-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or the simulation fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config(std::env::args().nth(1).map(PathBuf::from))?;

    // 2. Initialize structured logging.
    init_logging(&config.simulation.log_level)?;
    info!("warengeld-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        steps = config.simulation.steps,
        household_cohorts = config.population.households.len(),
        company_cohorts = config.population.companies.len(),
        savings_bank = config.savings_bank.enabled,
        "Simulation configured"
    );

    // 3. Seed the economy.
    let mut economy = Economy::from_config(&config)?;
    info!(
        households = economy.households.len(),
        companies = economy.companies.len(),
        money_supply = %economy.money_supply(),
        "Economy seeded"
    );

    // 4. Run.
    let steps = config.simulation.steps;
    let mut recorder = HistoryCallback::new();
    let result = runner::run_simulation(&mut economy, steps, &mut recorder)?;

    // 5. Report.
    runner::log_simulation_end(&result);
    let report = RunReport::new(steps, &result, recorder.into_history(), &economy);
    let json = serde_json::to_string_pretty(&report).map_err(EngineError::from)?;
    println!("{json}");

    info!(total_ticks = result.total_ticks, "warengeld-engine shutdown complete");
    Ok(())
}

/// Load the simulation configuration.
///
/// An explicit path must exist. Without one, `warengeld-config.yaml` in
/// the working directory is used if present, else the defaults. Returns
/// the path actually read.
fn load_config(
    explicit: Option<PathBuf>,
) -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok((SimulationConfig::default(), None));
            }
            default.to_path_buf()
        }
    };
    let config = SimulationConfig::from_file(&path)?;
    Ok((config, Some(path)))
}

/// Install the tracing subscriber on stderr.
fn init_logging(level: &str) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| EngineError::Logging {
            message: format!("invalid log level {level:?}: {e}"),
        })?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| EngineError::Logging {
            message: e.to_string(),
        })
}
