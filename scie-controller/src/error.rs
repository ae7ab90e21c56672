//! Controller error taxonomy (spec.md §7, the subset relevant to the
//! adaptive loop: persisted-state corruption on restore).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("persisted controller state corrupt: {0}")]
    StateCorrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
