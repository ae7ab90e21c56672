//! Command handlers. Each function delegates to exactly one SCIE crate per
//! step and returns the process exit code (spec.md §6: 0 success, 1
//! investigate, 2 block) — no validation, generation, or control logic
//! lives here.

use anyhow::Context;
use scie_analyzer::IntegrityVector;
use scie_core::Config;
use std::path::{Path, PathBuf};

fn rule_set(repo: &Path) -> anyhow::Result<scie_core::CanonicalRuleSet> {
    scie_extractor::extract(repo, "HEAD", chrono::Utc::now()).context("extracting rule set")
}

pub fn validate(
    repo: &Path,
    evidence_dir: &Path,
    config: Config,
    incremental: bool,
    rules: Option<Vec<String>>,
) -> anyhow::Result<i32> {
    let (ctx, writer) = crate::context::build(repo, evidence_dir, config)?;
    let set = rule_set(repo)?;
    let validator = scie_validator::Validator::new(set, scie_validator::DependencyMap::new());

    let report = if let Some(rule_ids) = rules {
        validator.validate_rules(&ctx, &rule_ids)?
    } else if incremental {
        validator.validate_incremental(&ctx, None)?
    } else {
        validator.validate_all(&ctx)?
    };

    println!("mode: {:?}", report.mode);
    for (outcome, count) in report.counts_by_outcome() {
        println!("  {outcome:?}: {count}");
    }
    println!("score: {:.2}%", report.score());

    if report.mode != scie_core::ValidationMode::Cancelled {
        writer.append(serde_json::json!({ "kind": "VALIDATION", "report": report }))?;
    }

    Ok(report.exit_code())
}

pub fn scorecard(repo: &Path, evidence_dir: &Path, config: Config) -> anyhow::Result<i32> {
    let (ctx, _writer) = crate::context::build(repo, evidence_dir, config)?;
    let set = rule_set(repo)?;
    let validator = scie_validator::Validator::new(set, scie_validator::DependencyMap::new());
    let report = validator.validate_all(&ctx)?;

    println!("Compliance Scorecard");
    println!("====================");
    for (outcome, count) in report.counts_by_outcome() {
        println!("  {outcome:?}: {count}");
    }
    println!("  Score: {:.2}%", report.score());
    Ok(report.exit_code())
}

/// Shared by `health` and `tune`: runs a fresh validation, verifies the
/// evidence chain, and folds both into an `IntegrityVector`.
fn current_vector(
    repo: &Path,
    evidence_dir: &Path,
    config: &Config,
) -> anyhow::Result<(IntegrityVector, f64)> {
    let (ctx, writer) = crate::context::build(repo, evidence_dir, config.clone())?;
    let set = rule_set(repo)?;
    let validator = scie_validator::Validator::new(set, scie_validator::DependencyMap::new());
    let report = validator.validate_all(&ctx)?;

    let tail = writer.tail_sequence()?;
    let verification = writer.verify_chain(1, tail)?;
    let mut timestamps = Vec::with_capacity(tail as usize);
    for sequence in 1..=tail {
        if let Ok(entry) = writer.read(sequence) {
            timestamps.push(entry.timestamp);
        }
    }

    let vector = scie_analyzer::compute_vector(&report, &verification, &timestamps);
    Ok((vector, report.score()))
}

pub fn health(repo: &Path, evidence_dir: &Path, config: Config) -> anyhow::Result<i32> {
    let (vector, score) = current_vector(repo, evidence_dir, &config)?;
    println!("Integrity Vector");
    println!("  x (structural coverage):  {:.4}", vector.x);
    println!("  y (content integrity):    {:.4}", vector.y);
    println!("  z (temporal coherence):   {:.4}", vector.z);
    println!("  |V|:                      {:.4}", vector.magnitude_weighted(&config.integrity_weights));
    println!("  validation score:         {score:.2}%");
    Ok(0)
}

pub fn adversary(evidence_dir: &Path, cleanup: bool) -> anyhow::Result<i32> {
    let scratch_root = evidence_dir.join("scratch");
    std::fs::create_dir_all(&scratch_root)?;
    let seed = chrono::Utc::now().timestamp() as u64;
    let report = scie_analyzer::run_adversarial_suite(seed, &scratch_root, !cleanup)?;

    println!("Adversarial Suite (seed {})", report.seed);
    for attack in &report.attacks {
        let mark = if attack.detected { "DETECTED" } else { "MISSED" };
        println!("  {:?}: {mark} — {}", attack.kind, attack.detail);
    }
    println!("detection rate: {:.2}", report.detection_rate);

    Ok(if report.detection_rate >= 1.0 { 0 } else { 1 })
}

pub fn tune(repo: &Path, evidence_dir: &Path, config: Config) -> anyhow::Result<i32> {
    let (ctx, writer) = crate::context::build(repo, evidence_dir, config.clone())?;
    let (vector, _score) = current_vector(repo, evidence_dir, &config)?;

    let weights = config.integrity_weights.clone();
    let mut controller = scie_controller::Controller::restore(config, &writer)
        .unwrap_or_else(|_| scie_controller::Controller::new(ctx.config.clone()));
    let report = controller.cycle(vector.magnitude_weighted(&weights), None);
    controller.persist(writer.as_ref(), &report)?;

    println!("cycle {}: error={:.4} output={:.4}", report.cycle_count, report.step.error, report.step.output);
    println!("thresholds: {:?}", report.thresholds);
    println!("convergence: {:?}", report.convergence);
    println!("anomaly: {:?}", report.anomaly);
    println!("recommendation: {:?}", report.recommendation);

    Ok(match report.convergence {
        scie_controller::Convergence::Divergent => 1,
        _ => 0,
    })
}

pub fn compare(baseline_path: &PathBuf, new_path: &PathBuf, config: Config) -> anyhow::Result<i32> {
    let baseline: IntegrityVector =
        serde_json::from_slice(&std::fs::read(baseline_path).context("reading baseline vector")?)?;
    let new: IntegrityVector = serde_json::from_slice(&std::fs::read(new_path).context("reading new vector")?)?;

    match scie_analyzer::compare_vectors(Some(&baseline), &new, &config.integrity_weights) {
        Ok(comparison) => {
            println!("delta |V|: {:.4}", comparison.delta_magnitude);
            println!("focus dimension: {}", comparison.focus_dimension);
            println!("status: {:?}", comparison.status);
            println!("action: {:?}", comparison.action);
            Ok(match comparison.action {
                scie_analyzer::ComparisonAction::Approve => 0,
                scie_analyzer::ComparisonAction::Investigate => 1,
                scie_analyzer::ComparisonAction::Block => 2,
            })
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(1)
        }
    }
}

pub fn verify_chain(evidence_dir: &Path) -> anyhow::Result<i32> {
    let writer = scie_evidence::EvidenceWriter::new(evidence_dir, std::time::Duration::from_secs(30))?;
    let tail = writer.tail_sequence()?;
    let verification = writer.verify_chain(1, tail)?;

    println!("entries checked: {}", verification.entries_checked);
    if verification.valid {
        println!("chain valid");
        Ok(0)
    } else {
        println!("chain broken:");
        for brk in &verification.breaks {
            println!("  {brk:?}");
        }
        Ok(2)
    }
}
