//! End-to-end controller scenarios.

use scie_controller::{Controller, Convergence, PolicyRecommendation};
use scie_core::Config;

/// Starting 0.15 below setpoint, with the environment itself improving
/// `|V|` by a fixed 0.03 every cycle (independent of the controller's own
/// output), the controller must report `CONVERGED` within 10 cycles and
/// never push a threshold outside `[0.20, 0.80]`.
#[test]
fn controller_converges_from_below_within_ten_cycles() {
    let config = Config::default();
    let mut controller = Controller::new(config);
    let mut magnitude: f64 = 0.55;
    let mut convergence = Convergence::Learning;

    for cycle in 1..=10 {
        let report = controller.cycle(magnitude, None);
        convergence = report.convergence;

        assert!(
            (0.20..=0.80).contains(&report.thresholds.mi_threshold),
            "mi_threshold left bounds at cycle {cycle}: {}",
            report.thresholds.mi_threshold
        );
        assert!(
            (0.20..=0.80).contains(&report.thresholds.density_threshold),
            "density_threshold left bounds at cycle {cycle}: {}",
            report.thresholds.density_threshold
        );
        assert!(
            (0.20..=0.80).contains(&report.thresholds.linking_aggressiveness),
            "linking_aggressiveness left bounds at cycle {cycle}: {}",
            report.thresholds.linking_aggressiveness
        );
        assert!(report.step.integral.abs() <= config_i_max(), "integral exceeded I_max at cycle {cycle}");

        if convergence == Convergence::Converged {
            break;
        }
        magnitude = (magnitude + 0.03).min(1.0);
    }

    assert_eq!(convergence, Convergence::Converged, "controller failed to converge within 10 cycles");
}

fn config_i_max() -> f64 {
    Config::default().i_max
}

/// An adversarial suite reporting a 0.80 detection rate (4 of 5 attacks
/// caught) against the default 0.98 floor must trigger
/// `POLICY_REINFORCEMENT`, and persisting the cycle must record the
/// detection rate that drove the recommendation.
#[test]
fn degraded_adversarial_detection_triggers_policy_reinforcement() {
    let config = Config::default();
    let mut controller = Controller::new(config);

    let detected = 4usize;
    let total = 5usize;
    let detection_rate = detected as f64 / total as f64;
    assert!((detection_rate - 0.80).abs() < 1e-9);

    let report = controller.cycle(0.70, Some(detection_rate));
    assert_eq!(report.recommendation, PolicyRecommendation::PolicyReinforcement);
    assert_eq!(controller.state().detection_rate_history.last(), Some(&detection_rate));

    struct NullEvidence;
    impl scie_core::EvidenceSink for NullEvidence {
        fn submit(&self, _payload: serde_json::Value) -> Result<u64, scie_core::CoreError> {
            Ok(1)
        }
    }
    let sequence = controller.persist(&NullEvidence, &report).unwrap();
    assert_eq!(sequence, 1);
}
