//! End-to-end validator scenarios run against a real filesystem snapshot
//! rather than hand-built `ValidationReport`s.

use scie_core::{
    CanonicalRuleSet, Clock, Config, CoreContext, FsRepository, Modality, Provenance, Rule,
    RuleCategory, RuleSource, Severity, SystemClock, ValidationMode,
};
use scie_validator::{DependencyMap, Validator};
use std::sync::Arc;

struct NullEvidence;
impl scie_core::EvidenceSink for NullEvidence {
    fn submit(&self, _payload: serde_json::Value) -> Result<u64, scie_core::CoreError> {
        Ok(0)
    }
}

fn context(root: &std::path::Path) -> CoreContext {
    CoreContext::new(
        root.to_path_buf(),
        Config::default(),
        Arc::new(SystemClock) as Arc<dyn Clock>,
        Arc::new(FsRepository::new(root)),
        Arc::new(NullEvidence),
    )
}

fn must_rule(id: &str, statement: &str, evidence_paths: Vec<String>) -> Rule {
    Rule {
        rule_id: id.into(),
        category: RuleCategory::ChartStructure,
        modality: Modality::Must,
        severity: Severity::High,
        statement: statement.into(),
        source: RuleSource { file: "sot.md".into(), line: 1 },
        evidence_paths,
        provenance: Provenance::TextRequirement,
    }
}

/// A minimal compliant repository with `chart.yaml` present but no
/// `compatibility.semver` file of its own: two MUST rules (metadata,
/// owner) are satisfied by `chart.yaml` existing; a third (semver) fails
/// because its evidence file is absent.
#[test]
fn fresh_validation_of_minimal_compliant_repo() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chart.yaml"), "version: 1.0.0\nowner: team-x\nreviewers: [a, b]\n").unwrap();

    let mut set = CanonicalRuleSet::new("1.0.0", chrono::Utc::now());
    set.rules.push(must_rule("CS001", "chart.yaml has metadata", vec!["chart.yaml".into()]));
    set.rules.push(must_rule(
        "CS008",
        "chart.yaml has compatibility.semver",
        vec!["chart.yaml.compatibility.semver".into()],
    ));
    set.rules.push(must_rule("MD-CHART-045", "chart.yaml has owner field", vec!["chart.yaml".into()]));
    set.finalize();

    let validator = Validator::new(set, DependencyMap::new());
    let report = validator.validate_all(&context(dir.path())).unwrap();

    assert_eq!(report.results.len(), 3);
    assert!((report.score() - 66.666_666_666_666_67).abs() < 1e-6);
    assert_eq!(report.exit_code(), 1);
}

/// An unrelated README.md change only re-validates the rules the
/// dependency map says README.md affects, plus always-run rules; every
/// other rule is served from cache with an identical outcome to a full run.
#[test]
fn incremental_validation_after_unrelated_file_change() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chart.yaml"), "version: 1.0.0\n").unwrap();
    std::fs::write(dir.path().join("README.md"), "# before\n").unwrap();

    let readme_affected: Vec<String> = (0..12).map(|i| format!("README-{i:02}")).collect();
    let always_run: Vec<String> = (0..3).map(|i| format!("ALWAYS-{i}")).collect();

    let mut set = CanonicalRuleSet::new("1.0.0", chrono::Utc::now());
    for id in &readme_affected {
        set.rules.push(must_rule(id, "affected by README", vec!["chart.yaml".into()]));
    }
    for id in &always_run {
        set.rules.push(must_rule(id, "always run", vec!["chart.yaml".into()]));
    }
    // Five unrelated rules keep the affected fraction (15/20 = 0.75) under
    // the incremental-fallback threshold (default 0.78).
    for i in 0..5 {
        set.rules.push(must_rule(
            &format!("UNRELATED-{i}"),
            "unaffected by README",
            vec!["chart.yaml".into()],
        ));
    }
    set.finalize();

    let dependency_map = DependencyMap::new()
        .with_glob("**/README.md", readme_affected.clone())
        .with_always_run(always_run.clone());

    let validator = Validator::new(set, dependency_map);
    let ctx = context(dir.path());

    let full_report = validator.validate_all(&ctx).unwrap();
    assert_eq!(full_report.mode, ValidationMode::Full);

    std::fs::write(dir.path().join("README.md"), "# after\n").unwrap();
    let incremental_report = validator
        .validate_incremental(&ctx, Some(vec!["README.md".to_string()]))
        .unwrap();

    assert_eq!(incremental_report.mode, ValidationMode::Incremental);
    assert_eq!(incremental_report.results.len(), full_report.results.len());

    let mut full_outcomes: Vec<_> = full_report
        .results
        .iter()
        .map(|r| (r.rule_id.clone(), r.outcome))
        .collect();
    let mut incremental_outcomes: Vec<_> = incremental_report
        .results
        .iter()
        .map(|r| (r.rule_id.clone(), r.outcome))
        .collect();
    full_outcomes.sort();
    incremental_outcomes.sort();
    assert_eq!(full_outcomes, incremental_outcomes);

    // README-*/ALWAYS-* rules were actually re-executed (Fresh); the one
    // unrelated rule was served straight from the cache (Cached).
    let unrelated = incremental_report
        .results
        .iter()
        .find(|r| r.rule_id == "UNRELATED-0")
        .unwrap();
    assert_eq!(unrelated.cache_state, scie_core::CacheState::Cached);
}
