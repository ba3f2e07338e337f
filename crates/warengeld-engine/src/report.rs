//! Tick callback that records the run's history, and the JSON report the
//! engine prints when the run ends.

use serde::Serialize;
use tracing::debug;

use warengeld_core::{Economy, EconomySnapshot, SimulationResult, TickCallback, TickSummary};

/// Collects every tick summary in order.
#[derive(Debug, Default)]
pub struct HistoryCallback {
    history: Vec<TickSummary>,
}

impl HistoryCallback {
    /// Create an empty recorder.
    pub const fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Consume the recorder, returning the summaries.
    pub fn into_history(self) -> Vec<TickSummary> {
        self.history
    }
}

impl TickCallback for HistoryCallback {
    fn on_tick(&mut self, summary: &TickSummary, economy: &Economy) {
        debug!(
            tick = summary.tick,
            households = economy.households.len(),
            money_supply = %summary.money_supply,
            "Tick recorded"
        );
        self.history.push(summary.clone());
    }
}

/// The engine's output document.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Steps requested by the configuration.
    pub steps_requested: u64,
    /// Ticks actually executed.
    pub total_ticks: u64,
    /// Number of conservation anomalies over the whole run.
    pub anomaly_count: usize,
    /// Per-tick summaries, oldest first.
    pub history: Vec<TickSummary>,
    /// State of the economy after the last tick.
    pub final_state: EconomySnapshot,
}

impl RunReport {
    /// Assemble the report from a finished run.
    pub fn new(
        steps_requested: u64,
        result: &SimulationResult,
        history: Vec<TickSummary>,
        economy: &Economy,
    ) -> Self {
        Self {
            steps_requested,
            total_ticks: result.total_ticks,
            anomaly_count: result.anomalies.len(),
            history,
            final_state: economy.snapshot(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use warengeld_core::{SimulationConfig, run_simulation};

    use super::*;

    #[test]
    fn report_covers_every_tick() {
        let mut economy = Economy::from_config(&SimulationConfig::default()).unwrap();
        let mut recorder = HistoryCallback::new();
        let result = run_simulation(&mut economy, 3, &mut recorder).unwrap();

        let report = RunReport::new(3, &result, recorder.into_history(), &economy);
        assert_eq!(report.total_ticks, 3);
        assert_eq!(report.anomaly_count, 0);
        assert_eq!(
            report.history.iter().map(|s| s.tick).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        let last = report.history.last().unwrap();
        assert_eq!(last.money_supply, report.final_state.money_supply);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_ticks"], 3);
        assert_eq!(json["history"].as_array().unwrap().len(), 3);
        assert!(json["final_state"]["households"].is_array());
    }
}
