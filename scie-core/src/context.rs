//! Explicit context object threaded through constructors instead of module
//! singletons (spec.md §9 "Global singletons for paths / config → explicit
//! context").

use crate::clock::Clock;
use crate::config::Config;
use crate::repo::RepositoryReader;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque evidence ingestion seam. `scie-evidence::EvidenceWriter`
/// implements this; `CoreContext` depends only on the trait so the
/// dependency graph stays acyclic (validator/analyzer/controller all sit
/// below the evidence writer).
///
/// This also models the "consortium of cross-signing peers" as an opaque
/// evidence submitter (spec.md §9 Open Question 2): any implementor is a
/// valid submitter, and no cross-signature validation is assumed here.
pub trait EvidenceSink: Send + Sync {
    fn submit(&self, payload: serde_json::Value) -> Result<u64, crate::error::CoreError>;
}

pub struct CoreContext {
    pub repo_root: PathBuf,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub repository: Arc<dyn RepositoryReader>,
    pub evidence: Arc<dyn EvidenceSink>,
}

impl CoreContext {
    pub fn new(
        repo_root: PathBuf,
        config: Config,
        clock: Arc<dyn Clock>,
        repository: Arc<dyn RepositoryReader>,
        evidence: Arc<dyn EvidenceSink>,
    ) -> Self {
        Self { repo_root, config, clock, repository, evidence }
    }
}
