//! Modality lexicon and severity keyword derivation (spec.md §4.A,
//! GLOSSARY "Modality lexicon").

use scie_core::{Modality, Severity};

/// `MUST|MUSS|SHALL|REQUIRED → MUST`; `SHOULD|SOLL|RECOMMENDED → SHOULD`;
/// `MAY|MAG|OPTIONAL → COULD`; `NEVER|NIEMALS|FORBIDDEN → NEVER`.
pub fn derive_modality(statement: &str) -> Modality {
    let upper = statement.to_uppercase();
    const MUST: &[&str] = &["MUST", "MUSS", "SHALL", "REQUIRED"];
    const SHOULD: &[&str] = &["SHOULD", "SOLL", "RECOMMENDED"];
    const COULD: &[&str] = &["MAY", "MAG", "OPTIONAL"];
    const NEVER: &[&str] = &["NEVER", "NIEMALS", "FORBIDDEN"];

    if NEVER.iter().any(|kw| upper.contains(kw)) {
        Modality::Never
    } else if MUST.iter().any(|kw| upper.contains(kw)) {
        Modality::Must
    } else if SHOULD.iter().any(|kw| upper.contains(kw)) {
        Modality::Should
    } else if COULD.iter().any(|kw| upper.contains(kw)) {
        Modality::Could
    } else {
        Modality::Must
    }
}

/// Keyword-based severity derivation (spec.md §4.A "Severity derivation").
pub fn derive_severity(statement: &str) -> Severity {
    let lower = statement.to_lowercase();
    const CRITICAL: &[&str] = &[
        "critical", "must", "required", "mandatory", "forbidden", "security", "legal",
        "compliance",
    ];
    const HIGH: &[&str] = &["should", "important", "recommended", "standard"];

    if CRITICAL.iter().any(|kw| lower.contains(kw)) {
        Severity::Critical
    } else if HIGH.iter().any(|kw| lower.contains(kw)) {
        Severity::High
    } else {
        Severity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_recognizes_german_and_english_terms() {
        assert_eq!(derive_modality("chart.yaml MUSS owner haben"), Modality::Must);
        assert_eq!(derive_modality("reviewers SHOULD include two people"), Modality::Should);
        assert_eq!(derive_modality("teams MAY opt out"), Modality::Could);
        assert_eq!(derive_modality("plaintext secrets NIEMALS committed"), Modality::Never);
    }

    #[test]
    fn severity_prioritizes_critical_keywords() {
        assert_eq!(derive_severity("this is a mandatory security control"), Severity::Critical);
        assert_eq!(derive_severity("teams should follow the standard layout"), Severity::High);
        assert_eq!(derive_severity("informational note about naming"), Severity::Medium);
    }
}
