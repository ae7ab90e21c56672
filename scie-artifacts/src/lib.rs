//! Artifact Generator (spec.md §4.B): emits the five deterministic
//! derivatives from a `CanonicalRuleSet`. Grounded on `knhk-validation`'s
//! policy/contract split (`policy_engine.rs`, `resolved_schema.rs`) and on
//! the teacher's dispatch-table idiom (spec.md §9 "Per-rule validator
//! stubs → dispatch table").

mod cli_tool;
mod contract;
mod policy;
mod test_suite;
mod validator_code;

use scie_core::{Artifact, ArtifactKind, CanonicalRuleSet};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("artifact bijection broken: rule {rule_id} missing from {artifact}")]
    BijectionBroken { rule_id: String, artifact: &'static str },
}

pub struct GeneratedArtifacts {
    pub validator: Artifact,
    pub policy: Artifact,
    pub contract: Artifact,
    pub cli: Artifact,
    pub tests: Artifact,
}

/// Fixed "generated-from" marker used only in comments — does not affect
/// the byte-identity of the semantically relevant portions (spec.md §4.B
/// "Determinism").
const GENERATOR_TAG: &str = "scie-artifacts";

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// `generate(rule_set) → {validator, policy, contract, cli, tests}`
/// (spec.md §4.B). Runs an internal bijection self-check after generation;
/// failure is fatal (spec.md §7 `ARTIFACT_BIJECTION_BROKEN`).
pub fn generate(rule_set: &CanonicalRuleSet) -> Result<GeneratedArtifacts, GenerateError> {
    let validator_content = validator_code::render(rule_set, GENERATOR_TAG);
    let policy_content = policy::render(rule_set, GENERATOR_TAG);
    let contract_content = contract::render(rule_set, GENERATOR_TAG);
    let cli_content = cli_tool::render(rule_set, GENERATOR_TAG);
    let tests_content = test_suite::render(rule_set, GENERATOR_TAG);

    let validator_coverage: BTreeMap<String, bool> = rule_set
        .rules
        .iter()
        .map(|r| (r.rule_id.clone(), validator_code::dispatches(&validator_content, &r.rule_id)))
        .collect();
    let policy_coverage: BTreeMap<String, bool> = rule_set
        .rules
        .iter()
        .map(|r| (r.rule_id.clone(), policy::covers(&policy_content, &r.rule_id)))
        .collect();
    let contract_coverage: BTreeMap<String, bool> = rule_set
        .rules
        .iter()
        .map(|r| (r.rule_id.clone(), contract::covers(&contract_content, &r.rule_id)))
        .collect();
    let tests_coverage: BTreeMap<String, bool> = rule_set
        .rules
        .iter()
        .map(|r| (r.rule_id.clone(), test_suite::covers(&tests_content, &r.rule_id)))
        .collect();

    // Cross-artifact bijection check (spec.md §4.B).
    for rule in &rule_set.rules {
        if !validator_coverage.get(&rule.rule_id).copied().unwrap_or(false) {
            return Err(GenerateError::BijectionBroken {
                rule_id: rule.rule_id.clone(),
                artifact: "VALIDATOR_CODE",
            });
        }
        for (coverage, name) in [
            (&policy_coverage, "POLICY_DOCUMENT"),
            (&contract_coverage, "CONTRACT_SCHEMA"),
            (&tests_coverage, "TEST_SUITE"),
        ] {
            if !coverage.get(&rule.rule_id).copied().unwrap_or(false) {
                return Err(GenerateError::BijectionBroken {
                    rule_id: rule.rule_id.clone(),
                    artifact: name,
                });
            }
        }
    }

    Ok(GeneratedArtifacts {
        validator: Artifact {
            kind: ArtifactKind::ValidatorCode,
            corpus_version: rule_set.corpus_version.clone(),
            artifact_hash: hash_content(&validator_content),
            content: validator_content,
            rule_coverage: validator_coverage,
        },
        policy: Artifact {
            kind: ArtifactKind::PolicyDocument,
            corpus_version: rule_set.corpus_version.clone(),
            artifact_hash: hash_content(&policy_content),
            content: policy_content,
            rule_coverage: policy_coverage,
        },
        contract: Artifact {
            kind: ArtifactKind::ContractSchema,
            corpus_version: rule_set.corpus_version.clone(),
            artifact_hash: hash_content(&contract_content),
            content: contract_content,
            rule_coverage: contract_coverage,
        },
        cli: Artifact {
            kind: ArtifactKind::CliTool,
            corpus_version: rule_set.corpus_version.clone(),
            artifact_hash: hash_content(&cli_content),
            content: cli_content,
            rule_coverage: BTreeMap::new(),
        },
        tests: Artifact {
            kind: ArtifactKind::TestSuite,
            corpus_version: rule_set.corpus_version.clone(),
            artifact_hash: hash_content(&tests_content),
            content: tests_content,
            rule_coverage: tests_coverage,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scie_core::{Modality, Provenance, Rule, RuleCategory, RuleSource, Severity};

    fn rule_set_with(n: usize) -> CanonicalRuleSet {
        let mut set = CanonicalRuleSet::new("1.0.0", chrono::Utc::now());
        for i in 0..n {
            set.rules.push(Rule {
                rule_id: format!("R-{i:04}"),
                category: RuleCategory::ChartStructure,
                modality: Modality::Must,
                severity: Severity::Critical,
                statement: format!("rule number {i}"),
                source: RuleSource { file: "sot.md".into(), line: i as u32 },
                evidence_paths: vec!["chart.yaml".into()],
                provenance: Provenance::TextRequirement,
            });
        }
        set.finalize();
        set
    }

    #[test]
    fn generate_satisfies_bijection() {
        let set = rule_set_with(5);
        let artifacts = generate(&set).expect("bijection must hold");
        for rule in &set.rules {
            assert!(artifacts.validator.covers(&rule.rule_id));
            assert!(artifacts.policy.covers(&rule.rule_id));
            assert!(artifacts.contract.covers(&rule.rule_id));
            assert!(artifacts.tests.covers(&rule.rule_id));
        }
    }

    #[test]
    fn generate_is_byte_stable_across_calls() {
        let set = rule_set_with(10);
        let a = generate(&set).unwrap();
        let b = generate(&set).unwrap();
        assert_eq!(a.validator.artifact_hash, b.validator.artifact_hash);
        assert_eq!(a.policy.artifact_hash, b.policy.artifact_hash);
        assert_eq!(a.contract.artifact_hash, b.contract.artifact_hash);
        assert_eq!(a.tests.artifact_hash, b.tests.artifact_hash);
    }

    #[test]
    fn empty_rule_set_still_generates() {
        let set = rule_set_with(0);
        let artifacts = generate(&set).unwrap();
        assert!(artifacts.validator.rule_coverage.is_empty());
    }
}
