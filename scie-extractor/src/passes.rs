//! The four-pass scan (spec.md §4.A "Algorithm").

use crate::lexicon::{derive_modality, derive_severity};
use regex::Regex;
use scie_core::{ExtractionWarning, Provenance, Rule, RuleCategory, RuleSource};
use std::sync::OnceLock;

fn numbered_rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s+Regel\s*\((.+)\)\s*$").unwrap())
}

fn policy_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\.\s+(.+)$").unwrap())
}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_\- ]{1,60}):\s*(\S.*)$").unwrap())
}

/// Prefixes that look like key-value lines but are purely informational
/// (spec.md §4.A pass 3 "excluding a denylist of informational prefixes").
const KEY_VALUE_DENYLIST: &[&str] = &["Note", "Example", "See", "TODO", "Author"];

/// Infers a domain `RuleCategory` from the file path and statement text.
/// spec.md does not define this mapping explicitly; SCIE keys off of
/// keyword hints, defaulting to `CorePrinciples` (Open Question resolved
/// in DESIGN.md).
fn infer_category(file: &str, statement: &str) -> RuleCategory {
    let haystack = format!("{file} {statement}").to_lowercase();
    let hits: &[(&str, RuleCategory)] = &[
        ("chart", RuleCategory::ChartStructure),
        ("manifest", RuleCategory::ManifestStructure),
        ("version", RuleCategory::VersioningGovernance),
        ("architecture", RuleCategory::Architecture),
        ("deploy", RuleCategory::DeploymentCicd),
        ("cicd", RuleCategory::DeploymentCicd),
        ("matrix", RuleCategory::MatrixRegistry),
        ("extension", RuleCategory::Extensions),
        ("technology", RuleCategory::TechnologyStandards),
        ("critical", RuleCategory::CriticalPolicies),
        ("security", RuleCategory::CriticalPolicies),
        ("lifted", RuleCategory::Lifted),
    ];
    for (needle, category) in hits {
        if haystack.contains(needle) {
            return category.clone();
        }
    }
    RuleCategory::CorePrinciples
}

fn normalize(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_rule(
    out: &mut Vec<Rule>,
    file: &str,
    line: u32,
    statement: &str,
    provenance: Provenance,
    evidence_paths: Vec<String>,
) {
    let normalized = normalize(statement);
    if normalized.is_empty() {
        return;
    }
    let category = infer_category(file, &normalized);
    let rule_id = Rule::derive_id(&category, file, line, &normalized);
    out.push(Rule {
        rule_id,
        modality: derive_modality(&normalized),
        severity: derive_severity(&normalized),
        statement: normalized,
        source: RuleSource { file: file.to_string(), line },
        evidence_paths,
        category,
        provenance,
    });
}

/// Pass 1 + Pass 2: structured (fenced, format-tagged) blocks. Recursively
/// walks parsed YAML/TOML values (scalars → `YAML_FIELD`, lists →
/// `YAML_LIST`) and separately captures every meaningful raw line inside
/// the block as `YAML_LINE` (intentional over-capture, spec.md §4.A).
pub fn extract_structured_blocks(
    file: &str,
    text: &str,
    out: &mut Vec<Rule>,
    warnings: &mut Vec<ExtractionWarning>,
) {
    let fence_re = {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"(?s)```(yaml|yml|toml)\n(.*?)```").unwrap())
    };

    let mut block_line_starts = Vec::new();
    for capture in fence_re.captures_iter(text) {
        let whole = capture.get(0).unwrap();
        let start_line = text[..whole.start()].lines().count() as u32 + 1;
        block_line_starts.push(start_line);
        let format = capture.get(1).unwrap().as_str();
        let body = capture.get(2).unwrap().as_str();

        let parsed_value: Option<serde_yaml::Value> = if format == "toml" {
            toml::from_str::<toml::Value>(body)
                .ok()
                .and_then(|v| serde_json::to_value(v).ok())
                .and_then(|v| serde_yaml::to_value(v).ok())
        } else {
            serde_yaml::from_str(body).ok()
        };

        match parsed_value {
            Some(value) => {
                walk_yaml_value(file, start_line, "$", &value, out);
            }
            None => {
                warnings.push(ExtractionWarning {
                    file: file.to_string(),
                    reason: format!("unparseable {format} block at line {start_line}"),
                });
            }
        }

        for (offset, raw_line) in body.lines().enumerate() {
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed == "---" {
                continue;
            }
            push_rule(
                out,
                file,
                start_line + offset as u32,
                trimmed,
                Provenance::YamlLine,
                Vec::new(),
            );
        }
    }
}

fn walk_yaml_value(file: &str, line: u32, path: &str, value: &serde_yaml::Value, out: &mut Vec<Rule>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, val) in map {
                let key_str = key.as_str().unwrap_or("?").to_string();
                let child_path = format!("{path}.{key_str}");
                walk_yaml_value(file, line, &child_path, val, out);
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            let statement = format!("{path} is a list with {} entries", seq.len());
            push_rule(out, file, line, &statement, Provenance::YamlList, vec![path.to_string()]);
            for item in seq {
                walk_yaml_value(file, line, &format!("{path}[]"), item, out);
            }
        }
        serde_yaml::Value::Null => {}
        scalar => {
            let rendered = match scalar {
                serde_yaml::Value::String(s) => s.clone(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => return,
            };
            let statement = format!("{path} = {rendered}");
            push_rule(out, file, line, &statement, Provenance::YamlField, vec![path.to_string()]);
        }
    }
}

/// Pass 3: prose patterns outside structured blocks, matched in the order
/// specified by spec.md §4.A.
pub fn extract_prose_patterns(file: &str, text: &str, out: &mut Vec<Rule>) {
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let line = raw_line.trim_end();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(captures) = numbered_rule_re().captures(trimmed) {
            let desc = captures.get(2).unwrap().as_str();
            push_rule(out, file, line_no, desc, Provenance::TextRequirement, Vec::new());
            continue;
        }

        let modality_hit = {
            let upper = trimmed.to_uppercase();
            ["MUST", "MUSS", "SHALL", "REQUIRED", "SHOULD", "SOLL", "RECOMMENDED", "MAY", "MAG",
                "OPTIONAL", "NEVER", "NIEMALS", "FORBIDDEN"]
                .iter()
                .any(|kw| upper.contains(kw))
        };
        if modality_hit {
            push_rule(out, file, line_no, trimmed, Provenance::TextRequirement, Vec::new());
            continue;
        }

        if (trimmed.starts_with('-') || trimmed.starts_with('*') || trimmed.starts_with('+'))
            && trimmed.len() > 10
        {
            let body = trimmed.trim_start_matches(['-', '*', '+']).trim();
            push_rule(out, file, line_no, body, Provenance::ListItem, Vec::new());
            continue;
        }

        if trimmed.starts_with('|') && !is_table_separator(trimmed) {
            push_rule(out, file, line_no, trimmed, Provenance::TableRow, Vec::new());
            continue;
        }

        if let Some(captures) = policy_item_re().captures(trimmed) {
            let body = captures.get(2).unwrap().as_str();
            push_rule(out, file, line_no, body, Provenance::PolicyItem, Vec::new());
            continue;
        }

        if let Some(captures) = key_value_re().captures(trimmed) {
            let key = captures.get(1).unwrap().as_str();
            if KEY_VALUE_DENYLIST.iter().any(|d| key.eq_ignore_ascii_case(d)) {
                continue;
            }
            push_rule(out, file, line_no, trimmed, Provenance::KeyValue, Vec::new());
        }
    }
}

fn is_table_separator(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}
