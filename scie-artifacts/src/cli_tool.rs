//! CLI_TOOL artifact: a standalone entry point supporting at least
//! `validate` and `scorecard`, no logic beyond delegation (spec.md §4.B).
//! Emitted as a thin source stub, grounded on `knhk-validation/src/main.rs`'s
//! delegate-then-exit shape.

use scie_core::CanonicalRuleSet;
use std::fmt::Write;

pub fn render(rule_set: &CanonicalRuleSet, generator_tag: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Generated by {generator_tag} — DO NOT EDIT BY HAND");
    let _ = writeln!(out, "// corpus_version = {}", rule_set.corpus_version);
    let _ = writeln!(out, "fn main() {{");
    let _ = writeln!(out, "    let args: Vec<String> = std::env::args().collect();");
    let _ = writeln!(out, "    match args.get(1).map(String::as_str) {{");
    let _ = writeln!(out, "        Some(\"validate\") => scie_validator::delegate_validate(),");
    let _ = writeln!(out, "        Some(\"scorecard\") => scie_validator::delegate_scorecard(),");
    let _ = writeln!(out, "        _ => eprintln!(\"usage: tool <validate|scorecard>\"),");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out
}
