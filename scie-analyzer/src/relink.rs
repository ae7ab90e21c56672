//! Relinking (spec.md §4.E "Relinking"): for each weak cluster, propose
//! internal densification (and auto-apply it) or external links for
//! missing node types, ranked by severity of weakness.

use crate::graph::{Cluster, GraphAnalysis};
use serde::{Deserialize, Serialize};

/// The closed set of evidence-entry "kind" tags this system emits
/// (spec.md §4.D payload kinds: validation runs, artifact generation,
/// controller adjustments, adversarial results, archival). Not named
/// explicitly by spec.md §4.E; recorded as a design decision in
/// DESIGN.md.
pub const ALL_NODE_TYPES: &[&str] =
    &["VALIDATION", "ARTIFACT_GENERATION", "CONTROLLER_ADJUSTMENT", "ADVERSARIAL_RESULT", "ARCHIVAL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SuggestionKind {
    InternalDensification { node_pair: (u64, u64) },
    ExternalLink { missing_type: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelinkSuggestion {
    pub cluster_index: usize,
    pub severity: SuggestionSeverity,
    pub kind: SuggestionKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelinkResult {
    pub suggestions: Vec<RelinkSuggestion>,
    pub applied_links: Vec<(u64, u64)>,
}

fn severity_for(cluster: &Cluster, mi_threshold: f64, density_threshold: f64) -> SuggestionSeverity {
    let mi_weak = cluster.mutual_information < mi_threshold;
    let density_weak = cluster.density < density_threshold;
    match (mi_weak, density_weak) {
        (true, true) => SuggestionSeverity::High,
        (true, false) | (false, true) => SuggestionSeverity::Medium,
        (false, false) => SuggestionSeverity::Low,
    }
}

fn missing_types(cluster: &Cluster) -> Vec<String> {
    let present: std::collections::HashSet<&str> =
        cluster.node_types.iter().map(String::as_str).collect();
    ALL_NODE_TYPES
        .iter()
        .filter(|t| !present.contains(*t))
        .map(|t| t.to_string())
        .collect()
}

/// `relink(weak_clusters) → {suggestions, applied_links}`. Internal
/// densification is auto-applied (edges among existing nodes that lack a
/// direct link); external links are proposed only, since creating a new
/// external node is a side effect the caller must perform.
pub fn relink(analysis: &GraphAnalysis, mi_threshold: f64, density_threshold: f64, max_links_per_cluster: usize) -> RelinkResult {
    let mut suggestions = Vec::new();
    let mut applied_links = Vec::new();

    for &cluster_index in &analysis.weak_cluster_indices {
        let cluster = &analysis.clusters[cluster_index];
        let severity = severity_for(cluster, mi_threshold, density_threshold);
        let missing = missing_types(cluster);

        if missing.is_empty() {
            // Contains all node types: propose internal densification.
            let mut count = 0;
            for i in 0..cluster.nodes.len() {
                if count >= max_links_per_cluster {
                    break;
                }
                for j in (i + 1)..cluster.nodes.len() {
                    if count >= max_links_per_cluster {
                        break;
                    }
                    let pair = (cluster.nodes[i], cluster.nodes[j]);
                    suggestions.push(RelinkSuggestion {
                        cluster_index,
                        severity,
                        kind: SuggestionKind::InternalDensification { node_pair: pair },
                    });
                    applied_links.push(pair);
                    count += 1;
                }
            }
        } else {
            for missing_type in missing.into_iter().take(max_links_per_cluster) {
                suggestions.push(RelinkSuggestion {
                    cluster_index,
                    severity,
                    kind: SuggestionKind::ExternalLink { missing_type },
                });
            }
        }
    }

    RelinkResult { suggestions, applied_links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Cluster;

    fn weak_analysis_with_all_types() -> GraphAnalysis {
        GraphAnalysis {
            clusters: vec![Cluster {
                nodes: vec![1, 2, 3],
                density: 0.01,
                mutual_information: 0.1,
                type_diversity: 1.0,
                node_types: ALL_NODE_TYPES.iter().map(|s| s.to_string()).collect(),
            }],
            weak_cluster_indices: vec![0],
            merkle_root: String::new(),
        }
    }

    #[test]
    fn full_type_coverage_proposes_internal_densification() {
        let analysis = weak_analysis_with_all_types();
        let result = relink(&analysis, 0.5, 0.05, 10);
        assert!(!result.applied_links.is_empty());
        assert!(result
            .suggestions
            .iter()
            .all(|s| matches!(s.kind, SuggestionKind::InternalDensification { .. })));
    }

    #[test]
    fn missing_type_proposes_external_link() {
        let mut analysis = weak_analysis_with_all_types();
        analysis.clusters[0].node_types = vec!["VALIDATION".to_string()];
        let result = relink(&analysis, 0.5, 0.05, 10);
        assert!(result
            .suggestions
            .iter()
            .any(|s| matches!(s.kind, SuggestionKind::ExternalLink { .. })));
        assert!(result.applied_links.is_empty());
    }

    #[test]
    fn respects_max_links_per_cluster() {
        let analysis = weak_analysis_with_all_types();
        let result = relink(&analysis, 0.5, 0.05, 1);
        assert_eq!(result.applied_links.len(), 1);
    }
}
