//! Integrity Analyzer (spec.md §4.E): maintains the `IntegrityVector` per
//! release, the evidence graph, identifies weak clusters, and simulates
//! adversarial attacks. Grounded on `knhk-closed-loop` (`governance.rs`
//! for decision-threshold tables, `observation.rs` for metrics-over-time,
//! `shadow.rs` for scratch-environment structure).

pub mod adversarial;
pub mod error;
pub mod graph;
pub mod relink;
pub mod vector;

pub use adversarial::{run_adversarial_suite, AdversarialReport, AttackKind, AttackResult};
pub use error::{AnalyzerError, AnalyzerResult};
pub use graph::{analyze_graph, Cluster, GraphAnalysis};
pub use relink::{relink, RelinkResult, RelinkSuggestion};
pub use vector::{compare_vectors, compute_vector, ComparisonAction, ComparisonStatus, IntegrityVector, VectorComparison};
