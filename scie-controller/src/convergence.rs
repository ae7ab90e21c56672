//! Convergence classification (spec.md §4.F "Convergence classification").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Convergence {
    Converged,
    Learning,
    Converging,
    Divergent,
}

/// `|e| ≤ 0.01 → CONVERGED`; `cycles < 3 → LEARNING`; `|e| > 0.10 →
/// DIVERGENT`; otherwise `CONVERGING`. Checked in that order so a
/// near-zero error during the first cycles still reports `CONVERGED`.
pub fn classify(error: f64, cycles: u64) -> Convergence {
    if error.abs() <= 0.01 {
        Convergence::Converged
    } else if cycles < 3 {
        Convergence::Learning
    } else if error.abs() > 0.10 {
        Convergence::Divergent
    } else {
        Convergence::Converging
    }
}
