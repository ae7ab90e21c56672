//! Rule execution. The generated `VALIDATOR_CODE` artifact (scie-artifacts)
//! is a dispatch-table stub meant for a human to fill in; this crate's
//! default checker is the generic fallback actually exercised at runtime:
//! a rule passes when every file in its `evidence_paths` exists in the
//! repository snapshot, fails listing what's missing, and is skipped when
//! it declares no evidence paths to check (nothing to assert).

use scie_core::{CacheState, Outcome, RepositoryReader, Rule, Severity, ValidationResult};
use sha2::{Digest, Sha256};
use std::sync::{mpsc, Arc};
use std::time::Instant;

/// Digest of a rule's own evidence paths (path + content, sorted), used as
/// the result cache's validity key instead of a whole-repository snapshot
/// digest — so an unrelated file changing elsewhere in the tree doesn't
/// invalidate every other rule's cached result (spec.md §4.C "Result
/// cache" / incremental-correctness invariant).
pub fn evidence_digest(rule: &Rule, repo: &dyn RepositoryReader) -> String {
    if rule.evidence_paths.is_empty() {
        return String::new();
    }
    let mut paths: Vec<&String> = rule.evidence_paths.iter().collect();
    paths.sort();
    let mut hasher = Sha256::new();
    for path in paths {
        hasher.update(path.as_bytes());
        match repo.read(path) {
            Ok(bytes) => hasher.update(bytes),
            Err(_) => hasher.update(b"<absent>"),
        }
    }
    hex::encode(hasher.finalize())
}

pub trait RuleChecker: Send + Sync {
    fn check(&self, rule: &Rule, repo: &dyn RepositoryReader) -> (Outcome, String, serde_json::Value);
}

pub struct DefaultRuleChecker;

impl RuleChecker for DefaultRuleChecker {
    fn check(&self, rule: &Rule, repo: &dyn RepositoryReader) -> (Outcome, String, serde_json::Value) {
        if rule.evidence_paths.is_empty() {
            return (Outcome::Skip, "no evidence paths declared".to_string(), serde_json::Value::Null);
        }
        let missing: Vec<&String> = rule
            .evidence_paths
            .iter()
            .filter(|path| !repo.exists(path))
            .collect();
        if missing.is_empty() {
            (
                Outcome::Pass,
                format!("all {} evidence path(s) present", rule.evidence_paths.len()),
                serde_json::json!({ "evidence_paths": rule.evidence_paths }),
            )
        } else {
            (
                Outcome::Fail,
                format!("missing evidence path(s): {}", missing.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")),
                serde_json::json!({ "missing": missing }),
            )
        }
    }
}

/// Runs a single rule check on a detached worker thread under a hard
/// timeout, catching panics the way spec.md §4.C "Failure semantics"
/// mandates (no check propagates to abort the run). A check that blows
/// past `timeout` never gets the chance to report anything: the waiting
/// side gives up on `recv_timeout` and immediately returns `TIMEOUT`
/// rather than relabeling a result that already ran to completion. The
/// worker thread itself is abandoned rather than joined — Rust has no safe
/// way to preempt a running thread — so a hung check leaks one thread
/// instead of blocking its rayon batch forever.
pub fn run_one(
    rule: &Rule,
    repo: &Arc<dyn RepositoryReader>,
    checker: &Arc<dyn RuleChecker>,
    timeout: std::time::Duration,
    now: chrono::DateTime<chrono::Utc>,
) -> ValidationResult {
    let rule_id = rule.rule_id.clone();
    let severity = severity_or(rule);
    let owned_rule = rule.clone();
    let repo = Arc::clone(repo);
    let checker = Arc::clone(checker);

    let (tx, rx) = mpsc::channel();
    let start = Instant::now();
    std::thread::spawn(move || {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            checker.check(&owned_rule, repo.as_ref())
        }))
        .unwrap_or_else(|_| (Outcome::Fail, "rule check panicked".to_string(), serde_json::Value::Null));
        let _ = tx.send(outcome);
    });

    let (outcome, message, evidence) = match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => (
            Outcome::Fail,
            format!("TIMEOUT after {}ms", timeout.as_millis()),
            serde_json::Value::Null,
        ),
    };

    ValidationResult {
        rule_id,
        outcome,
        severity,
        message,
        evidence,
        duration_ms: start.elapsed().as_millis() as u64,
        cache_state: CacheState::Fresh,
        timestamp: now,
    }
}

fn severity_or(rule: &Rule) -> Severity {
    rule.severity
}
