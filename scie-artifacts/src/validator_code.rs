//! VALIDATOR_CODE artifact: one check per rule, dispatchable by `rule_id`,
//! grouped by category in stable order (spec.md §4.B). Emits registration
//! calls into a dispatch table rather than generated methods (spec.md §9
//! "Per-rule validator stubs → dispatch table").

use scie_core::CanonicalRuleSet;
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn render(rule_set: &CanonicalRuleSet, generator_tag: &str) -> String {
    let mut by_category: BTreeMap<String, Vec<&scie_core::Rule>> = BTreeMap::new();
    for rule in &rule_set.rules {
        by_category
            .entry(rule.category.as_label())
            .or_default()
            .push(rule);
    }

    let mut out = String::new();
    let _ = writeln!(out, "// Generated by {generator_tag} — DO NOT EDIT BY HAND");
    let _ = writeln!(out, "// corpus_version = {}", rule_set.corpus_version);
    let _ = writeln!(out);
    let _ = writeln!(out, "pub type CheckFn = fn(&dyn std::any::Any) -> bool;");
    let _ = writeln!(out);
    let _ = writeln!(out, "pub fn register(registry: &mut std::collections::BTreeMap<&'static str, CheckFn>) {{");

    for (category, rules) in &by_category {
        let _ = writeln!(out, "    // category: {category}");
        for rule in rules {
            let _ = writeln!(
                out,
                "    registry.insert(\"{}\", |_ctx| false); // {}",
                rule.rule_id,
                rule.statement.replace('\n', " ")
            );
        }
    }
    let _ = writeln!(out, "}}");
    out
}

/// Whether `rule_id` has a registration call in a rendered validator body
/// (used for the bijection check).
pub fn dispatches(content: &str, rule_id: &str) -> bool {
    content.contains(&format!("\"{rule_id}\""))
}
