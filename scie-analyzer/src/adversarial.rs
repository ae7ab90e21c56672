//! Adversarial simulation (spec.md §4.E "Adversarial suite", §3
//! "AdversarialAttack"): injects the closed set of synthetic faults into a
//! scratch directory, verifies each would be caught by the chain verifier
//! or the rule-invariant check (stand-in for "policy evaluator" — spec.md
//! explicitly excludes an embedded Rego evaluator), and reports a
//! detection rate. Never touches the live chain. Grounded on
//! `knhk-closed-loop::shadow`'s copy-on-write scratch-environment idiom.

use scie_core::{Modality, Rule, RuleCategory, RuleSource, Severity, Provenance};
use scie_evidence::EvidenceWriter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackKind {
    HashChainBreak,
    FakeScore,
    WormGap,
    TimestampReversal,
    PolicyBypass,
}

pub const ALL_ATTACK_KINDS: &[AttackKind] = &[
    AttackKind::HashChainBreak,
    AttackKind::FakeScore,
    AttackKind::WormGap,
    AttackKind::TimestampReversal,
    AttackKind::PolicyBypass,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackResult {
    pub kind: AttackKind,
    pub detected: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdversarialReport {
    pub seed: u64,
    pub attacks: Vec<AttackResult>,
    pub detection_rate: f64,
}

fn attack_hash_chain_break(dir: &std::path::Path) -> AttackResult {
    let writer = EvidenceWriter::new(dir, std::time::Duration::from_secs(5)).unwrap();
    writer.append(serde_json::json!({"kind": "VALIDATION"})).unwrap();
    let e2 = writer.append(serde_json::json!({"kind": "VALIDATION"})).unwrap();
    writer.append(serde_json::json!({"kind": "VALIDATION"})).unwrap();

    let path = dir.join(format!("{:020}.json", e2.sequence));
    let mut entry: scie_evidence::EvidenceEntry =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    entry.sha512.replace_range(0..4, "dead");
    std::fs::write(&path, serde_json::to_vec_pretty(&entry).unwrap()).unwrap();

    let verification = writer.verify_chain(1, 3).unwrap();
    AttackResult {
        kind: AttackKind::HashChainBreak,
        detected: !verification.valid,
        detail: format!("{} break(s) found", verification.breaks.len()),
    }
}

fn attack_worm_gap(dir: &std::path::Path) -> AttackResult {
    let writer = EvidenceWriter::new(dir, std::time::Duration::from_secs(5)).unwrap();
    writer.append(serde_json::json!({"kind": "VALIDATION"})).unwrap();
    let e2 = writer.append(serde_json::json!({"kind": "VALIDATION"})).unwrap();
    writer.append(serde_json::json!({"kind": "VALIDATION"})).unwrap();
    std::fs::remove_file(dir.join(format!("{:020}.json", e2.sequence))).unwrap();

    let verification = writer.verify_chain(1, 3).unwrap();
    AttackResult {
        kind: AttackKind::WormGap,
        detected: !verification.valid,
        detail: format!("{} break(s) found", verification.breaks.len()),
    }
}

fn attack_timestamp_reversal(_dir: &std::path::Path) -> AttackResult {
    let now = chrono::Utc::now();
    let timestamps = [now, now - chrono::Duration::seconds(60), now + chrono::Duration::seconds(1)];
    let reversed = timestamps.windows(2).filter(|w| w[1] < w[0]).count();
    AttackResult {
        kind: AttackKind::TimestampReversal,
        detected: reversed > 0,
        detail: format!("{reversed} reversed pair(s) found"),
    }
}

fn attack_fake_score(_dir: &std::path::Path) -> AttackResult {
    // Claimed score inflates the true pass/fail tally recorded in the report.
    let claimed_score = 100.0;
    let true_passes = 1u32;
    let true_total = 3u32;
    let true_score = (true_passes as f64 / true_total as f64) * 100.0;
    AttackResult {
        kind: AttackKind::FakeScore,
        detected: (claimed_score - true_score).abs() > 1e-6,
        detail: format!("claimed {claimed_score}, actual {true_score:.2}"),
    }
}

fn attack_policy_bypass(_dir: &std::path::Path) -> AttackResult {
    // A NEVER-modality rule recorded at LOW severity violates spec.md §3's
    // invariant; `check_invariants` stands in for the policy evaluator.
    let rule = Rule {
        rule_id: "R-BYPASS".into(),
        category: RuleCategory::CriticalPolicies,
        modality: Modality::Never,
        severity: Severity::Low,
        statement: "must never expose secrets".into(),
        source: RuleSource { file: "scratch".into(), line: 1 },
        evidence_paths: vec![],
        provenance: Provenance::TextRequirement,
    };
    let violation = rule.check_invariants();
    AttackResult {
        kind: AttackKind::PolicyBypass,
        detected: violation.is_err(),
        detail: violation.err().unwrap_or_else(|| "no violation detected".to_string()),
    }
}

/// `run_adversarial_suite(seed) → AdversarialReport`. `retain` keeps the
/// scratch directory on disk for inspection instead of deleting it.
pub fn run_adversarial_suite(seed: u64, scratch_root: &std::path::Path, retain: bool) -> std::io::Result<AdversarialReport> {
    let mut attacks = Vec::new();

    for (i, kind) in ALL_ATTACK_KINDS.iter().enumerate() {
        let scratch_dir: PathBuf = scratch_root.join(format!("attack-{seed}-{i}"));
        std::fs::create_dir_all(&scratch_dir)?;
        let result = match kind {
            AttackKind::HashChainBreak => attack_hash_chain_break(&scratch_dir),
            AttackKind::WormGap => attack_worm_gap(&scratch_dir),
            AttackKind::TimestampReversal => attack_timestamp_reversal(&scratch_dir),
            AttackKind::FakeScore => attack_fake_score(&scratch_dir),
            AttackKind::PolicyBypass => attack_policy_bypass(&scratch_dir),
        };
        attacks.push(result);
        if !retain {
            let _ = std::fs::remove_dir_all(&scratch_dir);
        }
    }

    let detected = attacks.iter().filter(|a| a.detected).count();
    let detection_rate = detected as f64 / attacks.len() as f64;
    Ok(AdversarialReport { seed, attacks, detection_rate })
}
