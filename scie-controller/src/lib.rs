//! Adaptive Integrity Controller (spec.md §4.F): keeps `|V|` near a
//! configured setpoint by adjusting the Analyzer's weak-cluster thresholds
//! and the Relinker's aggressiveness through a bounded PID loop. Grounded
//! on `knhk-autonomic::controller::AutonomicController`'s MAPE-K shape,
//! narrowed from its 5-stage orchestration to the single control law
//! spec.md specifies: Monitor reads the vector trend (`window`), Analyze
//! computes `e(t)/I(t)/D(t)` (`pid`), Plan distributes `u(t)` across
//! thresholds and evaluates the policy overlay (`thresholds`), Execute
//! writes the result back and persists an evidence entry (`lib::Controller`).

pub mod convergence;
pub mod error;
pub mod pid;
pub mod thresholds;
pub mod window;

pub use convergence::Convergence;
pub use error::{ControllerError, ControllerResult};
pub use pid::{PidState, PidStep};
pub use thresholds::{PolicyRecommendation, Thresholds};
pub use window::{Anomaly, BandAdjustment, RollingWindow};

use scie_core::{Config, EvidenceSink};
use serde::{Deserialize, Serialize};

const CONTROLLER_ADJUSTMENT_KIND: &str = "CONTROLLER_ADJUSTMENT";

/// Everything the controller needs to resume exactly where it left off
/// (spec.md §4.F "Persistence"); this is the payload written to the WORM
/// chain each cycle and read back on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub pid: PidState,
    pub thresholds: Thresholds,
    pub window: RollingWindow,
    pub cycle_count: u64,
    pub detection_rate_history: Vec<f64>,
}

impl ControllerState {
    pub fn new(config: &Config) -> Self {
        Self {
            pid: PidState::default(),
            thresholds: Thresholds::new(config.mi_threshold, config.density_threshold, 0.5),
            window: RollingWindow::new(config.window_size),
            cycle_count: 0,
            detection_rate_history: Vec::new(),
        }
    }
}

/// One Monitor→Analyze→Plan→Execute cycle's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub magnitude: f64,
    pub delta_magnitude: f64,
    pub step: PidStep,
    pub thresholds: Thresholds,
    pub band_adjustment: BandAdjustment,
    pub anomaly: Anomaly,
    pub convergence: Convergence,
    pub recommendation: PolicyRecommendation,
    pub cycle_count: u64,
}

pub struct Controller {
    config: Config,
    state: ControllerState,
    last_magnitude: Option<f64>,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        let state = ControllerState::new(&config);
        Self { config, state, last_magnitude: None }
    }

    pub fn with_state(config: Config, state: ControllerState) -> Self {
        Self { config, state, last_magnitude: None }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Restores the most recently persisted state from the evidence chain
    /// (spec.md §4.F "On startup, it restores its state from the most
    /// recent such entry"). Scans backwards from the tail; returns a fresh
    /// `ControllerState` if none is found.
    pub fn restore(config: Config, writer: &scie_evidence::EvidenceWriter) -> ControllerResult<Self> {
        let tail = writer.tail_sequence().map_err(|e| ControllerError::StateCorrupt(e.to_string()))?;
        let mut sequence = tail;
        while sequence >= 1 {
            if let Ok(entry) = writer.read(sequence) {
                if entry.payload.get("kind").and_then(|v| v.as_str()) == Some(CONTROLLER_ADJUSTMENT_KIND) {
                    if let Some(state_value) = entry.payload.get("state") {
                        let state: ControllerState = serde_json::from_value(state_value.clone())?;
                        return Ok(Self::with_state(config, state));
                    }
                }
            }
            sequence -= 1;
        }
        Ok(Self::new(config))
    }

    /// Runs one control cycle: computes `Δ|V|` against the last observed
    /// magnitude, steps the PID law, distributes `u(t)` across thresholds,
    /// and classifies convergence/anomaly/policy trend. Does not persist —
    /// call `persist` with the evidence sink to do that.
    pub fn cycle(&mut self, magnitude: f64, detection_rate: Option<f64>) -> CycleReport {
        let delta_magnitude = magnitude - self.last_magnitude.unwrap_or(magnitude);
        self.last_magnitude = Some(magnitude);
        self.state.window.push(delta_magnitude);

        let (step, next_pid) = pid::step(&self.config, self.state.pid, magnitude);
        self.state.pid = next_pid;
        self.state.thresholds = self.state.thresholds.apply(step.output);
        self.state.cycle_count += 1;

        if let Some(rate) = detection_rate {
            self.state.detection_rate_history.push(rate);
        }

        CycleReport {
            magnitude,
            delta_magnitude,
            step,
            thresholds: self.state.thresholds,
            band_adjustment: self.state.window.band_adjustment(),
            anomaly: self.state.window.classify(delta_magnitude),
            convergence: convergence::classify(step.error, self.state.cycle_count),
            recommendation: thresholds::recommend(&self.state.detection_rate_history, self.config.detection_rate_floor),
            cycle_count: self.state.cycle_count,
        }
    }

    /// Writes `{state, report}` as a `CONTROLLER_ADJUSTMENT` evidence entry
    /// (spec.md §4.F "After each cycle, the controller writes its state and
    /// the adjustment record as an evidence entry").
    pub fn persist(
        &self,
        evidence: &dyn EvidenceSink,
        report: &CycleReport,
    ) -> Result<u64, scie_core::CoreError> {
        let payload = serde_json::json!({
            "kind": CONTROLLER_ADJUSTMENT_KIND,
            "state": self.state,
            "report": report,
        });
        evidence.submit(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullEvidence;
    impl EvidenceSink for NullEvidence {
        fn submit(&self, _payload: serde_json::Value) -> Result<u64, scie_core::CoreError> {
            Ok(0)
        }
    }

    #[test]
    fn cycle_converges_toward_setpoint_from_below() {
        let config = Config::default();
        let mut controller = Controller::new(config.clone());
        let mut magnitude = 0.55;
        let mut last_report = None;
        for _ in 0..50 {
            let report = controller.cycle(magnitude, None);
            magnitude = (magnitude + report.step.output).clamp(0.0, 1.0);
            last_report = Some(report);
        }
        let report = last_report.unwrap();
        assert!(report.step.error.abs() < 0.10, "error did not shrink: {}", report.step.error);
    }

    #[test]
    fn first_cycles_report_learning() {
        let config = Config::default();
        let mut controller = Controller::new(config);
        let report = controller.cycle(0.50, None);
        assert_eq!(report.convergence, Convergence::Learning);
    }

    #[test]
    fn persist_and_restore_round_trips_state() {
        let dir = tempfile::tempdir().unwrap();
        let writer = scie_evidence::EvidenceWriter::new(dir.path(), std::time::Duration::from_secs(5)).unwrap();
        let config = Config::default();
        let mut controller = Controller::new(config.clone());
        let report = controller.cycle(0.60, Some(1.0));
        controller.persist(&writer, &report).unwrap();

        let restored = Controller::restore(config, &writer).unwrap();
        assert_eq!(restored.state().cycle_count, 1);
        assert_eq!(restored.state().detection_rate_history, vec![1.0]);
    }

    #[test]
    fn restore_without_prior_entries_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let writer = scie_evidence::EvidenceWriter::new(dir.path(), std::time::Duration::from_secs(5)).unwrap();
        let config = Config::default();
        let controller = Controller::restore(config, &writer).unwrap();
        assert_eq!(controller.state().cycle_count, 0);
    }

    #[test]
    fn low_detection_rate_triggers_policy_reinforcement() {
        let config = Config::default();
        let mut controller = Controller::new(config);
        let report = controller.cycle(0.70, Some(0.80));
        assert_eq!(report.recommendation, PolicyRecommendation::PolicyReinforcement);
    }

    #[test]
    fn null_evidence_accepts_persisted_payload() {
        let config = Config::default();
        let mut controller = Controller::new(config);
        let report = controller.cycle(0.70, None);
        let sink = NullEvidence;
        assert_eq!(controller.persist(&sink, &report).unwrap(), 0);
    }
}
