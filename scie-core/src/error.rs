use thiserror::Error;

/// Cross-cutting error kinds shared by every SCIE component (spec.md §7).
///
/// Rule-level and check-level failures never surface here — they are
/// recorded as `ValidationResult::Fail` instead. Only infrastructure
/// failures escape through this type.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("corpus unreadable: {0}")]
    CorpusUnreadable(String),

    #[error("artifact bijection broken: rule {0} missing from {1}")]
    ArtifactBijectionBroken(String, &'static str),

    #[error("WORM store is read-only: {0}")]
    StoreReadonly(String),

    #[error("concurrent write: lock not acquired within {0:?}")]
    ConcurrentWrite(std::time::Duration),

    #[error("chain break detected at sequence {0}")]
    ChainBreak(u64),

    #[error("baseline integrity vector absent")]
    BaselineAbsent,

    #[error("repository I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
