//! File→rule dependency mapping (spec.md §4.C "Dependency model"): a
//! static, externally supplied configuration describing which rules are
//! affected by which files, plus always-run rules and rule-to-rule
//! transitive dependencies (e.g. a summary rule that depends on the rules
//! it summarizes).

use std::collections::{BTreeSet, HashMap, HashSet};

const MAX_CLOSURE_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    /// glob pattern -> rule ids affected by a matching file change.
    file_globs: Vec<(globset::GlobMatcher, BTreeSet<String>)>,
    /// rule id -> other rule ids that become affected transitively.
    rule_dependencies: HashMap<String, BTreeSet<String>>,
    /// rules that are always executed regardless of the change set.
    always_run: BTreeSet<String>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glob(mut self, pattern: &str, rule_ids: impl IntoIterator<Item = String>) -> Self {
        if let Ok(glob) = globset::Glob::new(pattern) {
            self.file_globs
                .push((glob.compile_matcher(), rule_ids.into_iter().collect()));
        }
        self
    }

    pub fn with_rule_dependency(mut self, rule_id: &str, depends_on: impl IntoIterator<Item = String>) -> Self {
        self.rule_dependencies
            .entry(rule_id.to_string())
            .or_default()
            .extend(depends_on);
        self
    }

    pub fn with_always_run(mut self, rule_ids: impl IntoIterator<Item = String>) -> Self {
        self.always_run.extend(rule_ids);
        self
    }

    pub fn always_run(&self) -> &BTreeSet<String> {
        &self.always_run
    }

    /// Maps a set of changed file paths to the rules directly affected by
    /// glob match (spec.md §4.C step 2).
    pub fn affected_by_files(&self, changed_files: &[String]) -> BTreeSet<String> {
        let mut affected = BTreeSet::new();
        for file in changed_files {
            for (matcher, rule_ids) in &self.file_globs {
                if matcher.is_match(file) {
                    affected.extend(rule_ids.iter().cloned());
                }
            }
        }
        affected
    }

    /// Expands a seed set of affected rules across `rule_dependencies`
    /// until a fixed point, bounded at `MAX_CLOSURE_ITERATIONS` (spec.md
    /// §4.C step 3).
    pub fn expand_transitive(&self, seed: BTreeSet<String>) -> BTreeSet<String> {
        let mut affected = seed;
        for _ in 0..MAX_CLOSURE_ITERATIONS {
            let before = affected.len();
            let additions: Vec<String> = affected
                .iter()
                .filter_map(|rule_id| self.rule_dependencies.get(rule_id))
                .flatten()
                .cloned()
                .collect();
            affected.extend(additions);
            if affected.len() == before {
                break;
            }
        }
        affected
    }

    /// Unions the always-run set into `affected` (spec.md §4.C step 4).
    pub fn union_always_run(&self, mut affected: BTreeSet<String>) -> BTreeSet<String> {
        affected.extend(self.always_run.iter().cloned());
        affected
    }
}

pub fn as_hashset(set: &BTreeSet<String>) -> HashSet<String> {
    set.iter().cloned().collect()
}
