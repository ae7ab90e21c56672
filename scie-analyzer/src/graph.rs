//! Evidence graph clustering (spec.md §4.E "Graph analysis"): connected
//! components via breadth-first walk over shared-UUID edges, density,
//! mutual-information proxy, and type diversity per cluster.

use scie_evidence::EvidenceEntry;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone)]
pub struct Cluster {
    pub nodes: Vec<u64>,
    pub density: f64,
    pub mutual_information: f64,
    pub type_diversity: f64,
    pub node_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GraphAnalysis {
    pub clusters: Vec<Cluster>,
    pub weak_cluster_indices: Vec<usize>,
    /// Merkle root over the entries' own leaf digests (spec.md §3
    /// "EvidenceGraph"), hex-encoded.
    pub merkle_root: String,
}

impl Default for GraphAnalysis {
    fn default() -> Self {
        Self { clusters: Vec::new(), weak_cluster_indices: Vec::new(), merkle_root: scie_evidence::merkle_root(&[]) }
    }
}

fn node_type(entry: &EvidenceEntry) -> String {
    entry
        .payload
        .get("kind")
        .and_then(|v| v.as_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

fn connected_components(nodes: &[u64], edges: &[(u64, u64)]) -> Vec<Vec<u64>> {
    let mut adjacency: HashMap<u64, Vec<u64>> = HashMap::new();
    for &(a, b) in edges {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut visited: HashSet<u64> = HashSet::new();
    let mut components = Vec::new();
    for &start in nodes {
        if visited.contains(&start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(node) = queue.pop_front() {
            component.push(node);
            if let Some(neighbors) = adjacency.get(&node) {
                for &next in neighbors {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// `analyze_graph() → {clusters, weak_cluster_set}` (spec.md §4.E).
/// Weak-cluster criteria (`mi_threshold`, `density_threshold`) are supplied
/// by the adaptive controller.
pub fn analyze_graph(
    entries: &[EvidenceEntry],
    edges: &[(u64, u64)],
    mi_threshold: f64,
    density_threshold: f64,
) -> GraphAnalysis {
    let by_sequence: HashMap<u64, &EvidenceEntry> =
        entries.iter().map(|e| (e.sequence, e)).collect();
    let nodes: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
    let components = connected_components(&nodes, edges);

    let mut clusters = Vec::new();
    let mut weak_cluster_indices = Vec::new();

    for component in components {
        if component.len() < 2 {
            continue;
        }
        let n = component.len();
        let node_set: HashSet<u64> = component.iter().copied().collect();
        let edge_count = edges
            .iter()
            .filter(|(a, b)| node_set.contains(a) && node_set.contains(b))
            .count();

        let density = (2.0 * edge_count as f64) / (n as f64 * (n as f64 - 1.0));
        let mutual_information = ((edge_count + 1) as f64).log2();

        let node_types: Vec<String> = component
            .iter()
            .filter_map(|seq| by_sequence.get(seq).map(|e| node_type(e)))
            .collect();
        let mut type_counts: HashMap<&str, usize> = HashMap::new();
        for t in &node_types {
            *type_counts.entry(t.as_str()).or_insert(0) += 1;
        }
        let total = node_types.len() as f64;
        let type_diversity: f64 = type_counts
            .values()
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum();

        let is_weak = mutual_information < mi_threshold || density < density_threshold;
        let cluster_index = clusters.len();
        if is_weak {
            weak_cluster_indices.push(cluster_index);
        }
        clusters.push(Cluster { nodes: component, density, mutual_information, type_diversity, node_types });
    }

    GraphAnalysis { clusters, weak_cluster_indices, merkle_root: scie_evidence::merkle_root(entries) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(seq: u64, kind: &str, refs: Vec<uuid::Uuid>) -> EvidenceEntry {
        EvidenceEntry {
            sequence: seq,
            timestamp: chrono::Utc::now(),
            prev_hash: "x".into(),
            payload: serde_json::json!({ "kind": kind }),
            sha512: format!("h{seq}"),
            blake2b: format!("b{seq}"),
            shared_refs: refs,
        }
    }

    #[test]
    fn finds_connected_component_and_flags_weak_cluster() {
        let shared = uuid::Uuid::new_v4();
        let entries = vec![
            entry(1, "VALIDATION", vec![shared]),
            entry(2, "EVIDENCE", vec![shared]),
            entry(3, "ISOLATED", vec![]),
        ];
        let edges = scie_evidence::shared_ref_edges(&entries);
        let analysis = analyze_graph(&entries, &edges, 1.5, 1.5);
        assert_eq!(analysis.clusters.len(), 1);
        assert_eq!(analysis.clusters[0].nodes, vec![1, 2]);
        assert!(!analysis.weak_cluster_indices.is_empty());
        assert_eq!(analysis.merkle_root, scie_evidence::merkle_root(&entries));
    }

    #[test]
    fn empty_entries_carry_the_zero_merkle_root() {
        let analysis = analyze_graph(&[], &[], 0.5, 0.5);
        assert_eq!(analysis.merkle_root, scie_evidence::merkle_root(&[]));
    }
}
