//! Analyzer error taxonomy (spec.md §7 `BASELINE_ABSENT`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("baseline integrity vector absent")]
    BaselineAbsent,
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
