//! Validator error taxonomy (spec.md §7: only the infrastructure kinds
//! escape a run — rule-level failures are recorded as `FAIL` results).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("repository root unreadable: {0}")]
    CorpusUnreadable(String),
    #[error("validation cache store corrupt: {0}")]
    CacheCorrupt(String),
}

pub type ValidatorResult<T> = Result<T, ValidatorError>;
