//! CONTRACT_SCHEMA artifact: a JSON-Schema-compatible document enumerating
//! the rule set with severity/modality counts (spec.md §4.B), grounded on
//! `knhk-validation::resolved_schema`'s self-describing schema convention.

use scie_core::CanonicalRuleSet;
use serde_json::json;

pub fn render(rule_set: &CanonicalRuleSet, generator_tag: &str) -> String {
    let mut by_severity: std::collections::BTreeMap<String, usize> = Default::default();
    let mut by_modality: std::collections::BTreeMap<String, usize> = Default::default();
    for rule in &rule_set.rules {
        *by_severity.entry(format!("{:?}", rule.severity)).or_insert(0) += 1;
        *by_modality.entry(format!("{:?}", rule.modality)).or_insert(0) += 1;
    }

    let rules: Vec<_> = rule_set
        .rules
        .iter()
        .map(|r| {
            json!({
                "rule_id": r.rule_id,
                "category": r.category.as_label(),
                "modality": format!("{:?}", r.modality),
                "severity": format!("{:?}", r.severity),
            })
        })
        .collect();

    let schema = json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://scie.internal/schemas/contract.json",
        "generator": generator_tag,
        "corpus_version": rule_set.corpus_version,
        "counts": {
            "by_severity": by_severity,
            "by_modality": by_modality,
        },
        "rules": rules,
    });

    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

pub fn covers(content: &str, rule_id: &str) -> bool {
    content.contains(&format!("\"rule_id\": \"{rule_id}\""))
}
