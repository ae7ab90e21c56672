//! Evidence Writer & WORM Chain (spec.md §4.D): a strictly monotone,
//! hash-chained append-only log of every validation outcome, generator
//! emission, controller adjustment, and adversarial-test result.

pub mod error;
pub mod merkle;
pub mod model;
pub mod writer;

pub use error::{EvidenceError, EvidenceResult};
pub use merkle::merkle_root;
pub use model::{ChainBreakKind, EvidenceEntry, VerificationResult, GENESIS_HASH};
pub use writer::EvidenceWriter;

/// Edges of the evidence graph (spec.md §4.D "Evidence graph view"): two
/// entries are connected if they share at least one reference UUID. Pure
/// metadata — chain integrity never depends on this.
pub fn shared_ref_edges(entries: &[EvidenceEntry]) -> Vec<(u64, u64)> {
    let mut edges = Vec::new();
    for (i, a) in entries.iter().enumerate() {
        if a.shared_refs.is_empty() {
            continue;
        }
        for b in &entries[i + 1..] {
            if b.shared_refs.iter().any(|r| a.shared_refs.contains(r)) {
                edges.push((a.sequence, b.sequence));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_ref_edges_connect_entries_with_common_uuid() {
        let shared = uuid::Uuid::new_v4();
        let entries = vec![
            EvidenceEntry {
                sequence: 1,
                timestamp: chrono::Utc::now(),
                prev_hash: GENESIS_HASH.to_string(),
                payload: serde_json::Value::Null,
                sha512: "a".into(),
                blake2b: "b".into(),
                shared_refs: vec![shared],
            },
            EvidenceEntry {
                sequence: 2,
                timestamp: chrono::Utc::now(),
                prev_hash: "a".into(),
                payload: serde_json::Value::Null,
                sha512: "c".into(),
                blake2b: "d".into(),
                shared_refs: vec![shared],
            },
        ];
        let edges = shared_ref_edges(&entries);
        assert_eq!(edges, vec![(1, 2)]);
    }
}
