//! Validation outcome data model (spec.md §3 "ValidationResult",
//! "ValidationReport").

use crate::rule::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Pass,
    Fail,
    Partial,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheState {
    Fresh,
    Cached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_id: String,
    pub outcome: Outcome,
    pub severity: Severity,
    pub message: String,
    pub evidence: serde_json::Value,
    pub duration_ms: u64,
    pub cache_state: CacheState,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationMode {
    Full,
    Incremental,
    RuleSubset,
    Cancelled,
}

/// Aggregated run (spec.md §3 "ValidationReport").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub run_id: uuid::Uuid,
    pub repository_snapshot: String,
    pub results: Vec<ValidationResult>,
    pub mode: ValidationMode,
}

impl ValidationReport {
    pub fn new(run_id: uuid::Uuid, repository_snapshot: String, mode: ValidationMode) -> Self {
        Self {
            run_id,
            repository_snapshot,
            results: Vec::new(),
            mode,
        }
    }

    /// Counts by outcome.
    pub fn counts_by_outcome(&self) -> BTreeMap<Outcome, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.outcome).or_insert(0) += 1;
        }
        counts
    }

    /// `score = (passes / total_applicable) × 100` (spec.md §3 invariant).
    /// `total_applicable` excludes `SKIP` results.
    pub fn score(&self) -> f64 {
        let applicable: Vec<&ValidationResult> = self
            .results
            .iter()
            .filter(|r| r.outcome != Outcome::Skip)
            .collect();
        if applicable.is_empty() {
            return 100.0;
        }
        let passes = applicable
            .iter()
            .filter(|r| r.outcome == Outcome::Pass)
            .count();
        (passes as f64 / applicable.len() as f64) * 100.0
    }

    /// Exit code per spec.md §6: 0 success, 1 investigate, 2 block.
    pub fn exit_code(&self) -> i32 {
        let has_critical_fail = self.results.iter().any(|r| {
            r.outcome == Outcome::Fail && matches!(r.severity, Severity::Critical)
        });
        if has_critical_fail {
            return 2;
        }
        if self.results.iter().any(|r| r.outcome == Outcome::Fail) {
            return 1;
        }
        0
    }
}
