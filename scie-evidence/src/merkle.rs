//! Merkle root over evidence-entry leaf digests (spec.md §3 "EvidenceGraph
//! ... Carries a `merkle_root` over all leaf digests"). Grounded on
//! `knhk-lockchain::merkle`'s bottom-up pairwise-hash-with-duplicate-last
//! construction; uses `sha2` (already this chain's hash primitive) rather
//! than introducing `blake3` as a new dependency.

use crate::EvidenceEntry;
use sha2::{Digest, Sha256};

type Leaf = [u8; 32];

fn leaf_hash(entry: &EvidenceEntry) -> Leaf {
    let mut hasher = Sha256::new();
    hasher.update(entry.sequence.to_le_bytes());
    hasher.update(entry.sha512.as_bytes());
    hasher.update(entry.blake2b.as_bytes());
    hasher.finalize().into()
}

fn parent_hash(left: &Leaf, right: &Leaf) -> Leaf {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Builds the leaf level from `entries`' own `(sequence, sha512, blake2b)`
/// digests, ordered by `sequence`, and folds it bottom-up into a single
/// root: pairs are hashed `H(left || right)`, and an odd level's last node
/// is paired with itself, repeating until one root remains. Returns the
/// all-zero digest, hex-encoded, for an empty entry set.
pub fn merkle_root(entries: &[EvidenceEntry]) -> String {
    if entries.is_empty() {
        return hex::encode([0u8; 32]);
    }

    let mut sorted: Vec<&EvidenceEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.sequence);
    let mut level: Vec<Leaf> = sorted.into_iter().map(leaf_hash).collect();

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for chunk in level.chunks(2) {
            let right = if chunk.len() > 1 { chunk[1] } else { chunk[0] };
            next.push(parent_hash(&chunk[0], &right));
        }
        level = next;
    }

    hex::encode(level[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GENESIS_HASH;

    fn entry(sequence: u64, sha512: &str) -> EvidenceEntry {
        EvidenceEntry {
            sequence,
            timestamp: chrono::Utc::now(),
            prev_hash: GENESIS_HASH.to_string(),
            payload: serde_json::Value::Null,
            sha512: sha512.to_string(),
            blake2b: "b".to_string(),
            shared_refs: vec![],
        }
    }

    #[test]
    fn empty_entries_yield_zero_root() {
        assert_eq!(merkle_root(&[]), hex::encode([0u8; 32]));
    }

    #[test]
    fn single_entry_root_is_its_own_leaf_hash() {
        let entries = vec![entry(1, "a")];
        assert_eq!(merkle_root(&entries), hex::encode(leaf_hash(&entries[0])));
    }

    #[test]
    fn root_is_deterministic_regardless_of_input_order() {
        let a = entry(1, "a");
        let b = entry(2, "b");
        let c = entry(3, "c");
        let in_order = merkle_root(&[a.clone(), b.clone(), c.clone()]);
        let shuffled = merkle_root(&[c, a, b]);
        assert_eq!(in_order, shuffled);
    }

    #[test]
    fn odd_leaf_count_duplicates_the_last_node() {
        let entries = vec![entry(1, "a"), entry(2, "b"), entry(3, "c")];
        let root = merkle_root(&entries);
        assert_ne!(root, hex::encode([0u8; 32]));
        assert_eq!(root.len(), 64);
    }

    #[test]
    fn changing_one_entry_changes_the_root() {
        let base = merkle_root(&[entry(1, "a"), entry(2, "b")]);
        let changed = merkle_root(&[entry(1, "a"), entry(2, "b-tampered")]);
        assert_ne!(base, changed);
    }
}
