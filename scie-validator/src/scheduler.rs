//! Batched worker pool (spec.md §4.C "Scheduling"): rules are partitioned
//! into batches by category; batches run sequentially, rules within a
//! batch run in parallel on a `rayon` pool sized `min(8, cpu_count)`.
//! Grounded on the teacher's `rayon` fan-out idiom (`mape/analyze.rs`).

use crate::checker::{run_one, RuleChecker};
use scie_core::{RepositoryReader, Rule, ValidationResult};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn batch_by_category<'a>(rules: &'a [&'a Rule]) -> Vec<Vec<&'a Rule>> {
    let mut batches: BTreeMap<String, Vec<&'a Rule>> = BTreeMap::new();
    for rule in rules {
        batches.entry(rule.category.as_label()).or_default().push(rule);
    }
    batches.into_values().collect()
}

/// Runs all batches sequentially, each batch's rules in parallel, and
/// merges results in `rule_id` order for reproducibility (spec.md §5
/// "Ordering guarantees").
pub fn run_batches(
    rules: &[&Rule],
    repo: &Arc<dyn RepositoryReader>,
    checker: &Arc<dyn RuleChecker>,
    pool: &rayon::ThreadPool,
    timeout: std::time::Duration,
    now: chrono::DateTime<chrono::Utc>,
    cancelled: &dyn Fn() -> bool,
) -> Vec<ValidationResult> {
    let batches = batch_by_category(rules);
    let mut results = Vec::with_capacity(rules.len());

    for batch in batches {
        if cancelled() {
            break;
        }
        let batch_results: Vec<ValidationResult> = pool.install(|| {
            use rayon::prelude::*;
            batch
                .par_iter()
                .map(|rule| run_one(rule, repo, checker, timeout, now))
                .collect()
        });
        results.extend(batch_results);
    }

    results.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
    results
}
