//! Evidence Writer & WORM Chain (spec.md §4.D), grounded on
//! `knhk-lockchain::storage`'s zero-padded-key/range/continuity
//! conventions — translated from its `sled`+`git2` backing store to the
//! plain one-file-per-entry filesystem layout spec.md §6 mandates
//! literally (see DESIGN.md for the dependency swap).

use crate::error::{EvidenceError, EvidenceResult};
use crate::model::{ChainBreakKind, EvidenceEntry, VerificationResult, GENESIS_HASH};
use blake2::Blake2b;
use blake2::digest::consts::U32;
use sha2::{Digest, Sha512};
use std::path::{Path, PathBuf};

type Blake2b256 = Blake2b<U32>;

pub struct EvidenceWriter {
    dir: PathBuf,
    archive_dir: PathBuf,
    lock: parking_lot::Mutex<()>,
    lock_timeout: std::time::Duration,
}

impl EvidenceWriter {
    pub fn new(dir: impl Into<PathBuf>, lock_timeout: std::time::Duration) -> EvidenceResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let archive_dir = dir.join("archive");
        std::fs::create_dir_all(&archive_dir)?;
        Ok(Self { dir, archive_dir, lock: parking_lot::Mutex::new(()), lock_timeout })
    }

    fn entry_path(&self, sequence: u64) -> PathBuf {
        self.dir.join(format!("{sequence:020}.json"))
    }

    fn sequence_files(&self) -> EvidenceResult<Vec<u64>> {
        let mut sequences = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".json") {
                if let Ok(seq) = stem.parse::<u64>() {
                    sequences.push(seq);
                }
            }
        }
        sequences.sort_unstable();
        Ok(sequences)
    }

    fn read_tail(&self) -> EvidenceResult<Option<EvidenceEntry>> {
        match self.sequence_files()?.last() {
            Some(&seq) => Ok(Some(self.read_raw(seq)?)),
            None => Ok(None),
        }
    }

    fn read_raw(&self, sequence: u64) -> EvidenceResult<EvidenceEntry> {
        let bytes = std::fs::read(self.entry_path(sequence))
            .map_err(|_| EvidenceError::NotFound(sequence))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn read(&self, sequence: u64) -> EvidenceResult<EvidenceEntry> {
        self.read_raw(sequence)
    }

    fn digest_input(sequence: u64, prev_hash: &str, payload_bytes: &[u8]) -> (String, String) {
        let mut sha = Sha512::new();
        sha.update(sequence.to_le_bytes());
        sha.update(prev_hash.as_bytes());
        sha.update(payload_bytes);
        let sha512 = hex::encode(sha.finalize());

        let mut blake = Blake2b256::new();
        blake.update(sequence.to_le_bytes());
        blake.update(prev_hash.as_bytes());
        blake.update(payload_bytes);
        let blake2b = hex::encode(blake.finalize());

        (sha512, blake2b)
    }

    /// `append(payload) → EvidenceEntry` (spec.md §4.D "Append protocol").
    pub fn append(&self, payload: serde_json::Value) -> EvidenceResult<EvidenceEntry> {
        self.append_with_refs(payload, Vec::new())
    }

    pub fn append_with_refs(
        &self,
        payload: serde_json::Value,
        shared_refs: Vec<uuid::Uuid>,
    ) -> EvidenceResult<EvidenceEntry> {
        let _guard = self
            .lock
            .try_lock_for(self.lock_timeout)
            .ok_or(EvidenceError::ConcurrentWrite)?;

        let tail = self.read_tail()?;
        let (sequence, prev_hash) = match &tail {
            Some(entry) => (entry.sequence + 1, entry.sha512.clone()),
            None => (1, GENESIS_HASH.to_string()),
        };

        let payload_bytes = serde_json::to_vec(&payload)?;
        let (sha512, blake2b) = Self::digest_input(sequence, &prev_hash, &payload_bytes);

        let entry = EvidenceEntry {
            sequence,
            timestamp: chrono::Utc::now(),
            prev_hash,
            payload,
            sha512,
            blake2b,
            shared_refs,
        };

        self.write_entry_atomic(&entry)?;
        Ok(entry)
    }

    fn write_entry_atomic(&self, entry: &EvidenceEntry) -> EvidenceResult<()> {
        let final_path = self.entry_path(entry.sequence);
        let tmp_path = self.dir.join(format!(".tmp-{:020}", entry.sequence));
        let bytes = serde_json::to_vec_pretty(entry)?;
        std::fs::write(&tmp_path, &bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                EvidenceError::StoreReadonly
            } else {
                EvidenceError::Io(e)
            }
        })?;
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// `verify_chain(from_seq, to_seq) → VerificationResult` (spec.md
    /// §4.D "Verification").
    pub fn verify_chain(&self, from_seq: u64, to_seq: u64) -> EvidenceResult<VerificationResult> {
        let from = from_seq.max(1);
        let mut breaks = Vec::new();
        let mut expected_prev_hash: Option<String> = if from > 1 {
            self.read_raw(from - 1).ok().map(|e| e.sha512)
        } else {
            Some(GENESIS_HASH.to_string())
        };
        let mut checked = 0u64;
        let mut expected_sequence = from;

        for sequence in from..=to_seq {
            let entry = match self.read_raw(sequence) {
                Ok(entry) => entry,
                Err(_) => {
                    breaks.push(ChainBreakKind::MissingEntry { sequence });
                    expected_sequence = sequence + 1;
                    continue;
                }
            };
            checked += 1;
            if entry.sequence != expected_sequence {
                breaks.push(ChainBreakKind::SequenceGap { expected: expected_sequence, found: entry.sequence });
            }
            expected_sequence = entry.sequence + 1;

            let payload_bytes = serde_json::to_vec(&entry.payload)?;
            let (sha512, _) = Self::digest_input(entry.sequence, &entry.prev_hash, &payload_bytes);
            if sha512 != entry.sha512 {
                breaks.push(ChainBreakKind::HashMismatch { sequence: entry.sequence });
            }
            if let Some(expected_prev) = &expected_prev_hash {
                if *expected_prev != entry.prev_hash {
                    breaks.push(ChainBreakKind::PrevHashMismatch { sequence: entry.sequence });
                }
            }
            expected_prev_hash = Some(entry.sha512.clone());
        }

        Ok(VerificationResult { valid: breaks.is_empty(), entries_checked: checked, breaks })
    }

    /// Copies `artifact_path` into the archive directory under a
    /// timestamped name and records the archival as its own evidence
    /// entry (spec.md §4.D "Archival").
    pub fn archive(&self, artifact_path: &Path, reason: &str) -> EvidenceResult<PathBuf> {
        let file_name = artifact_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "artifact".to_string());
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.fZ");
        let archived_path = self.archive_dir.join(format!("{stamp}-{file_name}"));
        std::fs::copy(artifact_path, &archived_path)?;
        self.append(serde_json::json!({
            "kind": "ARCHIVAL",
            "source": artifact_path.to_string_lossy(),
            "archived_to": archived_path.to_string_lossy(),
            "reason": reason,
        }))?;
        Ok(archived_path)
    }

    pub fn tail_sequence(&self) -> EvidenceResult<u64> {
        Ok(self.read_tail()?.map(|e| e.sequence).unwrap_or(0))
    }
}

impl scie_core::EvidenceSink for EvidenceWriter {
    fn submit(&self, payload: serde_json::Value) -> Result<u64, scie_core::CoreError> {
        self.append(payload)
            .map(|entry| entry.sequence)
            .map_err(|err| match err {
                EvidenceError::ConcurrentWrite => scie_core::CoreError::ConcurrentWrite(self.lock_timeout),
                EvidenceError::StoreReadonly => scie_core::CoreError::StoreReadonly(self.dir.display().to_string()),
                EvidenceError::ChainBreak(_) => scie_core::CoreError::ChainBreak(0),
                EvidenceError::NotFound(seq) => scie_core::CoreError::ChainBreak(seq),
                EvidenceError::Io(e) => scie_core::CoreError::Io(e),
                EvidenceError::Serde(e) => scie_core::CoreError::Serde(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(dir: &Path) -> EvidenceWriter {
        EvidenceWriter::new(dir, std::time::Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn append_chains_sequence_and_prev_hash() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        let e1 = w.append(serde_json::json!({"a": 1})).unwrap();
        let e2 = w.append(serde_json::json!({"a": 2})).unwrap();
        assert_eq!(e1.sequence, 1);
        assert_eq!(e2.sequence, 2);
        assert_eq!(e2.prev_hash, e1.sha512);
    }

    #[test]
    fn verify_chain_detects_tamper() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        w.append(serde_json::json!({"a": 1})).unwrap();
        w.append(serde_json::json!({"a": 2})).unwrap();
        w.append(serde_json::json!({"a": 3})).unwrap();

        let result = w.verify_chain(1, 3).unwrap();
        assert!(result.valid);

        // Flip a byte in the middle entry's stored hash.
        let path = dir.path().join(format!("{:020}.json", 2));
        let mut entry: EvidenceEntry = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        entry.sha512.replace_range(0..2, "ff");
        std::fs::write(&path, serde_json::to_vec_pretty(&entry).unwrap()).unwrap();

        let result = w.verify_chain(1, 3).unwrap();
        assert!(!result.valid);
        assert!(result.breaks.iter().any(|b| matches!(b, ChainBreakKind::HashMismatch { sequence: 2 })));
    }

    #[test]
    fn verify_chain_detects_gap_from_deleted_entry() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        w.append(serde_json::json!({"a": 1})).unwrap();
        w.append(serde_json::json!({"a": 2})).unwrap();
        w.append(serde_json::json!({"a": 3})).unwrap();
        std::fs::remove_file(dir.path().join(format!("{:020}.json", 2))).unwrap();

        let result = w.verify_chain(1, 3).unwrap();
        assert!(!result.valid);
        assert!(result.breaks.iter().any(|b| matches!(b, ChainBreakKind::MissingEntry { sequence: 2 })));
    }

    #[test]
    fn archive_copies_file_and_appends_entry() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        let artifact = dir.path().join("artifact.txt");
        std::fs::write(&artifact, b"content").unwrap();
        let archived = w.archive(&artifact, "drift detected").unwrap();
        assert!(archived.exists());
        assert_eq!(w.tail_sequence().unwrap(), 1);
    }
}
