//! POLICY_DOCUMENT artifact: declarative rules in a policy-clause
//! language consumed by an external evaluator (spec.md §4.B). The syntax
//! is a Rego-flavored clause, grounded on `knhk-validation::policy_engine`
//! being the teacher's chosen policy-evaluation surface — SCIE itself does
//! not embed a Rego runtime (Non-goals).

use scie_core::CanonicalRuleSet;
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn render(rule_set: &CanonicalRuleSet, generator_tag: &str) -> String {
    let mut by_severity: BTreeMap<scie_core::Severity, Vec<&scie_core::Rule>> = BTreeMap::new();
    for rule in &rule_set.rules {
        by_severity.entry(rule.severity).or_default().push(rule);
    }

    let mut out = String::new();
    let _ = writeln!(out, "# Generated by {generator_tag} — DO NOT EDIT BY HAND");
    let _ = writeln!(out, "package scie.policy");
    let _ = writeln!(out);

    for (severity, rules) in by_severity.iter().rev() {
        let _ = writeln!(out, "# severity: {severity:?}");
        for rule in rules {
            let _ = writeln!(
                out,
                "clause[\"{}\"] {{ modality := \"{:?}\"; statement := \"{}\" }}",
                rule.rule_id,
                rule.modality,
                rule.statement.replace('"', "'")
            );
        }
    }
    out
}

pub fn covers(content: &str, rule_id: &str) -> bool {
    content.contains(&format!("clause[\"{rule_id}\"]"))
}
