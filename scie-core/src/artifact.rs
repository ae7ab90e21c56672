//! Derivative artifact data model (spec.md §3 "Artifact", §4.B).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    ValidatorCode,
    PolicyDocument,
    ContractSchema,
    CliTool,
    TestSuite,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::ValidatorCode,
        ArtifactKind::PolicyDocument,
        ArtifactKind::ContractSchema,
        ArtifactKind::CliTool,
        ArtifactKind::TestSuite,
    ];
}

/// One of the five deterministic derivatives (spec.md §3 "Artifact").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub corpus_version: String,
    pub content: String,
    pub artifact_hash: String,
    /// rule_id -> covered (bijection bookkeeping, spec.md §4.B).
    pub rule_coverage: BTreeMap<String, bool>,
}

impl Artifact {
    pub fn covers(&self, rule_id: &str) -> bool {
        self.rule_coverage.get(rule_id).copied().unwrap_or(false)
    }
}
