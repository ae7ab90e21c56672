//! Evidence writer error taxonomy (spec.md §4.D "Failure semantics").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("exclusive lock on chain tail not acquired within timeout")]
    ConcurrentWrite,
    #[error("WORM store is read-only")]
    StoreReadonly,
    #[error("chain break detected: {0}")]
    ChainBreak(String),
    #[error("evidence entry not found for sequence {0}")]
    NotFound(u64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type EvidenceResult<T> = Result<T, EvidenceError>;
