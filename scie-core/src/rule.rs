//! Canonical rule data model (spec.md §3, "Rule" / "CanonicalRuleSet").

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Closed category enumeration. `MASTER_DEF_*` categories are represented
/// as `MasterDef(String)` since the corpus mints new suffixes over time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    Architecture,
    CriticalPolicies,
    VersioningGovernance,
    Lifted,
    ChartStructure,
    ManifestStructure,
    CorePrinciples,
    Extensions,
    TechnologyStandards,
    DeploymentCicd,
    MatrixRegistry,
    #[serde(untagged)]
    MasterDef(String),
}

impl RuleCategory {
    pub fn as_label(&self) -> String {
        match self {
            RuleCategory::MasterDef(suffix) => format!("MASTER_DEF_{suffix}"),
            other => format!("{other:?}")
                .chars()
                .fold(String::new(), |mut acc, c| {
                    if c.is_uppercase() && !acc.is_empty() {
                        acc.push('_');
                    }
                    acc.push(c.to_ascii_uppercase());
                    acc
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Must,
    Should,
    Could,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Source location a rule was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleSource {
    pub file: String,
    pub line: u32,
}

/// Extraction provenance tag (spec.md §9 "sum type over rule provenance
/// with a shared canonical projection"). Orthogonal to `RuleCategory`,
/// which classifies the rule's compliance domain rather than how it was
/// scraped out of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    YamlField,
    YamlList,
    YamlLine,
    TextRequirement,
    ListItem,
    TableRow,
    PolicyItem,
    KeyValue,
}

/// The unit of compliance (spec.md §3 "Rule").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    pub category: RuleCategory,
    pub modality: Modality,
    pub severity: Severity,
    pub statement: String,
    pub source: RuleSource,
    pub evidence_paths: Vec<String>,
    pub provenance: Provenance,
}

impl Rule {
    /// Derives a stable `rule_id` from `(category, source_file, line,
    /// normalized_statement)` (spec.md §4.A pass 4).
    pub fn derive_id(category: &RuleCategory, file: &str, line: u32, normalized: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(category.as_label().as_bytes());
        hasher.update(b"\0");
        hasher.update(file.as_bytes());
        hasher.update(b"\0");
        hasher.update(line.to_le_bytes());
        hasher.update(b"\0");
        hasher.update(normalized.as_bytes());
        let digest = hasher.finalize();
        format!("R-{}", hex::encode(&digest[..8]))
    }

    /// `modality=NEVER ⇒ severity≥HIGH` invariant check (spec.md §3).
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.modality == Modality::Never
            && !matches!(self.severity, Severity::High | Severity::Critical)
        {
            return Err(format!(
                "rule {} has modality NEVER but severity {:?} < HIGH",
                self.rule_id, self.severity
            ));
        }
        Ok(())
    }
}

/// Non-fatal per-file extraction problem (spec.md §4.A failure semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub file: String,
    pub reason: String,
}

/// Versioned collection of rules (spec.md §3 "CanonicalRuleSet").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRuleSet {
    pub corpus_version: String,
    pub extraction_timestamp: chrono::DateTime<chrono::Utc>,
    pub rules: Vec<Rule>,
    pub warnings: Vec<ExtractionWarning>,
}

impl CanonicalRuleSet {
    pub fn new(corpus_version: impl Into<String>, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            corpus_version: corpus_version.into(),
            extraction_timestamp: timestamp,
            rules: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Sorts by `rule_id` and drops exact duplicates, keeping the earliest
    /// source location (spec.md §4.A pass 4).
    pub fn finalize(&mut self) {
        self.rules.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        let mut seen: BTreeMap<String, usize> = BTreeMap::new();
        let mut deduped = Vec::with_capacity(self.rules.len());
        for rule in self.rules.drain(..) {
            match seen.get(&rule.rule_id) {
                Some(_) => continue,
                None => {
                    seen.insert(rule.rule_id.clone(), deduped.len());
                    deduped.push(rule);
                }
            }
        }
        self.rules = deduped;
    }

    /// SHA-256 over rules sorted by `rule_id`, serialized canonically
    /// (spec.md §3 "canonical_hash"). Two extractions of the same SoT
    /// content must produce bit-identical hashes.
    pub fn canonical_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for rule in &self.rules {
            let canonical = serde_json::to_string(rule).unwrap_or_default();
            hasher.update(canonical.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.binary_search_by(|r| r.rule_id.as_str().cmp(rule_id))
            .ok()
            .map(|idx| &self.rules[idx])
    }

    /// `diff(old, new) → {added, removed, changed}` (spec.md §4.A).
    pub fn diff(old: &CanonicalRuleSet, new: &CanonicalRuleSet) -> RuleSetDiff {
        let old_ids: BTreeMap<&str, &Rule> =
            old.rules.iter().map(|r| (r.rule_id.as_str(), r)).collect();
        let new_ids: BTreeMap<&str, &Rule> =
            new.rules.iter().map(|r| (r.rule_id.as_str(), r)).collect();

        let mut added = Vec::new();
        let mut removed = Vec::new();
        let mut changed = Vec::new();

        for (id, rule) in &new_ids {
            match old_ids.get(id) {
                None => added.push((*id).to_string()),
                Some(old_rule) => {
                    if old_rule.statement != rule.statement
                        || old_rule.severity != rule.severity
                        || old_rule.modality != rule.modality
                    {
                        changed.push((*id).to_string());
                    }
                }
            }
        }
        for id in old_ids.keys() {
            if !new_ids.contains_key(id) {
                removed.push((*id).to_string());
            }
        }

        RuleSetDiff { added, removed, changed }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule(id_suffix: &str, statement: &str) -> Rule {
        Rule {
            rule_id: format!("R-{id_suffix}"),
            category: RuleCategory::ChartStructure,
            modality: Modality::Must,
            severity: Severity::Critical,
            statement: statement.to_string(),
            source: RuleSource { file: "sot.md".into(), line: 1 },
            evidence_paths: vec!["chart.yaml".into()],
            provenance: Provenance::TextRequirement,
        }
    }

    #[test]
    fn canonical_hash_is_deterministic() {
        let ts = chrono::Utc::now();
        let mut a = CanonicalRuleSet::new("1.0.0", ts);
        a.rules.push(sample_rule("1", "chart.yaml has metadata"));
        a.rules.push(sample_rule("2", "chart.yaml has owner"));
        a.finalize();

        let mut b = CanonicalRuleSet::new("1.0.0", ts);
        b.rules.push(sample_rule("2", "chart.yaml has owner"));
        b.rules.push(sample_rule("1", "chart.yaml has metadata"));
        b.finalize();

        assert_eq!(a.canonical_hash(), b.canonical_hash());
    }

    #[test]
    fn finalize_dedups_exact_duplicates() {
        let ts = chrono::Utc::now();
        let mut set = CanonicalRuleSet::new("1.0.0", ts);
        set.rules.push(sample_rule("1", "same"));
        set.rules.push(sample_rule("1", "same"));
        set.finalize();
        assert_eq!(set.rules.len(), 1);
    }

    #[test]
    fn never_modality_requires_high_severity() {
        let mut rule = sample_rule("1", "forbidden op");
        rule.modality = Modality::Never;
        rule.severity = Severity::Medium;
        assert!(rule.check_invariants().is_err());
        rule.severity = Severity::High;
        assert!(rule.check_invariants().is_ok());
    }

    #[test]
    fn diff_reports_added_removed_changed() {
        let ts = chrono::Utc::now();
        let mut old = CanonicalRuleSet::new("1.0.0", ts);
        old.rules.push(sample_rule("1", "v1"));
        old.rules.push(sample_rule("2", "stable"));
        old.finalize();

        let mut new = CanonicalRuleSet::new("1.1.0", ts);
        new.rules.push(sample_rule("1", "v2"));
        new.rules.push(sample_rule("2", "stable"));
        new.rules.push(sample_rule("3", "new"));
        new.finalize();

        let diff = CanonicalRuleSet::diff(&old, &new);
        assert_eq!(diff.added, vec!["R-3".to_string()]);
        assert_eq!(diff.removed, Vec::<String>::new());
        assert_eq!(diff.changed, vec!["R-1".to_string()]);
    }
}
