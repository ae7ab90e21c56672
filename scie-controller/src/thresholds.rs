//! Threshold registry the PID output is distributed across (spec.md §4.F
//! "Distribution"), and the trend-driven policy overlay (spec.md §4.F
//! "Trend-driven adaptation"). Corresponds to the "Plan" stage of the
//! MAPE-K loop.

use serde::{Deserialize, Serialize};

const GLOBAL_MIN: f64 = 0.20;
const GLOBAL_MAX: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub mi_threshold: f64,
    pub density_threshold: f64,
    pub linking_aggressiveness: f64,
}

impl Thresholds {
    /// Clamps every axis to `[0.20, 0.80]` up front, so a caller seeding
    /// from a config default outside the global band (e.g. spec.md's
    /// `density_threshold = 0.05`) can never produce an out-of-bounds
    /// starting state — Testable Property 9 holds from cycle 0, not just
    /// after the first `apply`.
    pub fn new(mi_threshold: f64, density_threshold: f64, linking_aggressiveness: f64) -> Self {
        Self {
            mi_threshold: mi_threshold.clamp(GLOBAL_MIN, GLOBAL_MAX),
            density_threshold: density_threshold.clamp(GLOBAL_MIN, GLOBAL_MAX),
            linking_aggressiveness: linking_aggressiveness.clamp(GLOBAL_MIN, GLOBAL_MAX),
        }
    }

    /// `Δmi = 0.5u`, `Δdensity = 0.3u`, `Δlinking = 0.2u`, each result
    /// additionally clamped to `[0.20, 0.80]`.
    pub fn apply(&self, u: f64) -> Self {
        Self {
            mi_threshold: (self.mi_threshold + 0.5 * u).clamp(GLOBAL_MIN, GLOBAL_MAX),
            density_threshold: (self.density_threshold + 0.3 * u).clamp(GLOBAL_MIN, GLOBAL_MAX),
            linking_aggressiveness: (self.linking_aggressiveness + 0.2 * u).clamp(GLOBAL_MIN, GLOBAL_MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyRecommendation {
    PolicyReinforcement,
    IncreaseFuzzingDiversity,
    PolicyReview,
    None,
}

/// `detection_rate_history` holds the most recent runs, oldest first.
/// - rate < floor → `POLICY_REINFORCEMENT`
/// - rate == 1.00 and the last 3 runs are all 1.00 → `INCREASE_FUZZING_DIVERSITY`
/// - degrading for the last 3 runs → `POLICY_REVIEW`
pub fn recommend(detection_rate_history: &[f64], floor: f64) -> PolicyRecommendation {
    let Some(&latest) = detection_rate_history.last() else {
        return PolicyRecommendation::None;
    };

    if latest < floor {
        return PolicyRecommendation::PolicyReinforcement;
    }

    if detection_rate_history.len() >= 3 {
        let last3 = &detection_rate_history[detection_rate_history.len() - 3..];
        if last3.iter().all(|&r| r >= 1.0) {
            return PolicyRecommendation::IncreaseFuzzingDiversity;
        }
        if last3.windows(2).all(|w| w[1] < w[0]) {
            return PolicyRecommendation::PolicyReview;
        }
    }

    PolicyRecommendation::None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_clamp_to_global_bounds() {
        let thresholds = Thresholds::new(0.78, 0.78, 0.78);
        let next = thresholds.apply(0.05);
        assert!(next.mi_threshold <= GLOBAL_MAX);
        assert!(next.density_threshold <= GLOBAL_MAX);
        assert!(next.linking_aggressiveness <= GLOBAL_MAX);

        let low = Thresholds::new(0.21, 0.21, 0.21);
        let next_low = low.apply(-0.05);
        assert!(next_low.mi_threshold >= GLOBAL_MIN);
    }

    #[test]
    fn new_clamps_below_global_floor() {
        let thresholds = Thresholds::new(0.5, 0.05, 0.5);
        assert_eq!(thresholds.density_threshold, GLOBAL_MIN);
    }

    #[test]
    fn below_floor_triggers_reinforcement() {
        assert_eq!(recommend(&[0.99, 0.97], 0.98), PolicyRecommendation::PolicyReinforcement);
    }

    #[test]
    fn perfect_and_stable_triggers_fuzzing_diversity() {
        assert_eq!(recommend(&[1.0, 1.0, 1.0], 0.98), PolicyRecommendation::IncreaseFuzzingDiversity);
    }

    #[test]
    fn strictly_degrading_triggers_policy_review() {
        assert_eq!(recommend(&[1.0, 0.995, 0.99], 0.98), PolicyRecommendation::PolicyReview);
    }

    #[test]
    fn empty_history_recommends_nothing() {
        assert_eq!(recommend(&[], 0.98), PolicyRecommendation::None);
    }
}
