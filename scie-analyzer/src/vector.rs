//! Integrity vector computation and release comparison (spec.md §4.E
//! "Integrity vector computation", "Release comparison"), grounded on
//! `knhk-closed-loop::chatman_equation`'s scalar-composite-metric shape.

use scie_core::{IntegrityWeights, Outcome, Severity, ValidationReport};
use scie_evidence::VerificationResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrityVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl IntegrityVector {
    /// `|V| = sqrt((w_x·x)² + (w_y·y)² + (w_z·z)²) / sqrt(w_x² + w_y² + w_z²)`,
    /// so a uniform `{1.0, 1.0, 1.0}` weighting reduces to the unweighted
    /// `sqrt(x²+y²+z²)/sqrt(3)` form (spec.md §4.E "Integrity vector
    /// computation").
    pub fn magnitude_weighted(&self, weights: &IntegrityWeights) -> f64 {
        let denom = (weights.w_x.powi(2) + weights.w_y.powi(2) + weights.w_z.powi(2)).sqrt();
        if denom == 0.0 {
            return 0.0;
        }
        ((weights.w_x * self.x).powi(2) + (weights.w_y * self.y).powi(2) + (weights.w_z * self.z).powi(2)).sqrt()
            / denom
    }

    /// `|V|` under the default (uniform) weighting.
    pub fn magnitude(&self) -> f64 {
        self.magnitude_weighted(&IntegrityWeights::default())
    }
}

/// `x = (rules_passed_CRITICAL + rules_passed_HIGH) / (rules_total_CRITICAL + rules_total_HIGH)`.
fn structural_coverage(report: &ValidationReport) -> f64 {
    let relevant = |s: Severity| matches!(s, Severity::Critical | Severity::High);
    let total = report.results.iter().filter(|r| relevant(r.severity)).count();
    if total == 0 {
        return 0.0;
    }
    let passed = report
        .results
        .iter()
        .filter(|r| relevant(r.severity) && r.outcome == Outcome::Pass)
        .count();
    passed as f64 / total as f64
}

/// `y = 1` if the chain verifies; else proportional decay.
fn content_integrity(verification: &VerificationResult) -> f64 {
    if verification.entries_checked == 0 {
        return 1.0;
    }
    if verification.valid {
        1.0
    } else {
        1.0 - (verification.breaks.len() as f64 / verification.entries_checked as f64)
    }
}

/// `z = 1` if timestamps are monotone; else proportional to reversed pairs.
fn temporal_coherence(timestamps: &[chrono::DateTime<chrono::Utc>]) -> f64 {
    if timestamps.len() < 2 {
        return 1.0;
    }
    let total_pairs = timestamps.len() - 1;
    let reversed = timestamps.windows(2).filter(|w| w[1] < w[0]).count();
    if reversed == 0 {
        1.0
    } else {
        1.0 - (reversed as f64 / total_pairs as f64)
    }
}

/// `compute_vector(repo, chain, report) → IntegrityVector`.
pub fn compute_vector(
    report: &ValidationReport,
    verification: &VerificationResult,
    evidence_timestamps: &[chrono::DateTime<chrono::Utc>],
) -> IntegrityVector {
    IntegrityVector {
        x: structural_coverage(report),
        y: content_integrity(verification),
        z: temporal_coherence(evidence_timestamps),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonStatus {
    Improvement,
    Stable,
    Degradation,
    CriticalDecline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonAction {
    Approve,
    Investigate,
    Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorComparison {
    pub delta_magnitude: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub focus_dimension: &'static str,
    pub status: ComparisonStatus,
    pub action: ComparisonAction,
}

/// `compare_vectors(baseline, current) → {Δ|V|, per-axis deltas, recommendation}`
/// (spec.md §4.E "Release comparison"). Returns `BASELINE_ABSENT` if this
/// is the first run and no baseline exists yet; the caller creates one
/// from `current` (spec.md §4.E "Failure semantics").
pub fn compare_vectors(
    baseline: Option<&IntegrityVector>,
    current: &IntegrityVector,
    weights: &IntegrityWeights,
) -> crate::error::AnalyzerResult<VectorComparison> {
    let baseline = baseline.ok_or(crate::error::AnalyzerError::BaselineAbsent)?;
    let delta_magnitude = current.magnitude_weighted(weights) - baseline.magnitude_weighted(weights);
    let delta_x = current.x - baseline.x;
    let delta_y = current.y - baseline.y;
    let delta_z = current.z - baseline.z;

    let (status, action) = if delta_magnitude >= 0.05 {
        (ComparisonStatus::Improvement, ComparisonAction::Approve)
    } else if delta_magnitude > -0.03 {
        (ComparisonStatus::Stable, ComparisonAction::Approve)
    } else if delta_magnitude > -0.10 {
        (ComparisonStatus::Degradation, ComparisonAction::Investigate)
    } else {
        (ComparisonStatus::CriticalDecline, ComparisonAction::Block)
    };

    let focus_dimension = [("x", delta_x.abs()), ("y", delta_y.abs()), ("z", delta_z.abs())]
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(name, _)| name)
        .unwrap_or("x");

    Ok(VectorComparison { delta_magnitude, delta_x, delta_y, delta_z, focus_dimension, status, action })
}
