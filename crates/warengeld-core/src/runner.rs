//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`run_tick`] for a fixed number of steps,
//! notifies a [`TickCallback`] after each one, and collects every audit
//! anomaly. The loop stops early if the economy has no households left.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::{info, warn};

use warengeld_ledger::LedgerAnomaly;

use crate::economy::Economy;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Every anomaly the audit reported, in tick order.
    pub anomalies: Vec<LedgerAnomaly>,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, economy: &Economy);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _economy: &Economy) {}
}

/// Run `steps` ticks, or until no households remain.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails. Ticks already completed stay
/// applied to `economy`.
pub fn run_simulation(
    economy: &mut Economy,
    steps: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut final_summary: Option<TickSummary> = None;
    let mut anomalies = Vec::new();
    let mut total_ticks: u64 = 0;

    info!(
        steps,
        households = economy.households.len(),
        companies = economy.companies.len(),
        "Simulation starting"
    );

    while total_ticks < steps {
        let summary = tick::run_tick(economy)?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, economy);
        anomalies.extend(summary.anomalies.iter().cloned());

        let extinct = summary.households == 0;
        final_summary = Some(summary);
        if extinct {
            info!(tick = economy.tick, "No households left");
            break;
        }
    }

    Ok(SimulationResult {
        total_ticks,
        final_summary,
        anomalies,
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        anomalies = result.anomalies.len(),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            households = summary.households,
            companies = summary.active_companies,
            employed = summary.employed,
            money_supply = %summary.money_supply,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }

    if !result.anomalies.is_empty() {
        warn!(
            count = result.anomalies.len(),
            "Money conservation anomalies were reported"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::SimulationConfig;

    struct Recorder {
        ticks: Vec<u64>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, summary: &TickSummary, economy: &Economy) {
            assert_eq!(summary.tick, economy.tick);
            self.ticks.push(summary.tick);
        }
    }

    #[test]
    fn runs_requested_steps() {
        let mut economy = Economy::from_config(&SimulationConfig::default()).unwrap();
        let mut recorder = Recorder { ticks: Vec::new() };

        let result = run_simulation(&mut economy, 5, &mut recorder).unwrap();
        assert_eq!(result.total_ticks, 5);
        assert_eq!(recorder.ticks, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.final_summary.as_ref().map(|s| s.tick), Some(5));
        assert!(result.anomalies.is_empty());
        log_simulation_end(&result);
    }

    #[test]
    fn zero_steps_runs_nothing() {
        let mut economy = Economy::from_config(&SimulationConfig::default()).unwrap();
        let result = run_simulation(&mut economy, 0, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        assert_eq!(economy.tick, 0);
    }

    #[test]
    fn stops_when_no_households_remain() {
        let yaml = r"
household:
  max_age: 2
  max_generation: 0
population:
  households:
    - count: 2
      checking_account: 10
  companies: []
";
        let mut economy = Economy::from_config(&SimulationConfig::parse(yaml).unwrap()).unwrap();
        let result = run_simulation(&mut economy, 10, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 2);
        assert!(economy.households.is_empty());
        assert_eq!(result.final_summary.as_ref().map(|s| s.exits), Some(2));
        assert!(result.anomalies.is_empty());
        // What was not consumed ends with the state.
        assert!(economy.state.holdings() > dec!(0));
    }
}
