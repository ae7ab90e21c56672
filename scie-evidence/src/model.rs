//! WORM entry schema (spec.md §6 "WORM storage interface").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub sequence: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub prev_hash: String,
    pub payload: serde_json::Value,
    pub sha512: String,
    pub blake2b: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_refs: Vec<uuid::Uuid>,
}

/// Genesis `prev_hash` for the first entry in a chain: `sha512("genesis")`
/// (spec.md §3 "EvidenceEntry" invariant).
pub const GENESIS_HASH: &str =
    "9fad20395a815a68752128454ca2fc17538a5e03178c04e54dcd35bce0f252d2358be2547596623ab63a0408874c4213c21e50f507c03d73e6f286826a0862e6";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainBreakKind {
    SequenceGap { expected: u64, found: u64 },
    HashMismatch { sequence: u64 },
    PrevHashMismatch { sequence: u64 },
    MissingEntry { sequence: u64 },
}

#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub valid: bool,
    pub entries_checked: u64,
    pub breaks: Vec<ChainBreakKind>,
}
