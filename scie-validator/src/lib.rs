//! Parallel Incremental Validator (spec.md §4.C): executes rule checks
//! against a repository snapshot, producing a `ValidationReport` in full,
//! rule-subset, or change-scoped incremental modes. Grounded on
//! `knhk-workflow-engine`'s `rayon`/`DashMap` concurrency idioms.

pub mod cache;
pub mod checker;
pub mod error;
pub mod mapping;
pub mod scheduler;

pub use cache::ResultCache;
pub use checker::{evidence_digest, DefaultRuleChecker, RuleChecker};
pub use error::{ValidatorError, ValidatorResult};
pub use mapping::DependencyMap;

use scie_core::{CanonicalRuleSet, CoreContext, Rule, ValidationMode, ValidationReport};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn rule_version(rule: &Rule) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(rule).unwrap_or_default().as_bytes());
    hex::encode(hasher.finalize())
}

pub struct Validator {
    rule_set: CanonicalRuleSet,
    dependency_map: DependencyMap,
    cache: ResultCache,
    checker: Arc<dyn RuleChecker>,
    cancelled: Arc<AtomicBool>,
}

impl Validator {
    pub fn new(rule_set: CanonicalRuleSet, dependency_map: DependencyMap) -> Self {
        Self {
            rule_set,
            dependency_map,
            cache: ResultCache::new(),
            checker: Arc::new(DefaultRuleChecker),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_checker(mut self, checker: Arc<dyn RuleChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Handle other components can use to cancel an in-flight run (spec.md
    /// §5 "Cancellation"): in-flight rules finish, no new batch starts.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn pool(&self, ctx: &CoreContext) -> ValidatorResult<rayon::ThreadPool> {
        let workers = ctx.config.worker_count.max(1);
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| ValidatorError::CacheCorrupt(e.to_string()))
    }

    fn timeout(&self, ctx: &CoreContext) -> std::time::Duration {
        std::time::Duration::from_secs(ctx.config.rule_check_timeout_seconds)
    }

    fn run_rules(
        &self,
        ctx: &CoreContext,
        rules: &[&Rule],
        mode: ValidationMode,
    ) -> ValidatorResult<ValidationReport> {
        if !ctx.repository.exists(".") {
            return Err(ValidatorError::CorpusUnreadable(ctx.repo_root.display().to_string()));
        }
        let pool = self.pool(ctx)?;
        let now = ctx.clock.now();
        let snapshot = hex::encode(ctx.repository.snapshot_digest());
        let cancel_flag = self.cancelled.clone();
        let results = scheduler::run_batches(
            rules,
            &ctx.repository,
            &self.checker,
            &pool,
            self.timeout(ctx),
            now,
            &move || cancel_flag.load(Ordering::SeqCst),
        );
        for result in &results {
            if let Some(rule) = self.rule_set.get(&result.rule_id) {
                self.cache.put(
                    &result.rule_id,
                    &checker::evidence_digest(rule, ctx.repository.as_ref()),
                    &rule_version(rule),
                    result.clone(),
                    now,
                );
            }
        }
        let mode = if self.cancelled.load(Ordering::SeqCst) {
            ValidationMode::Cancelled
        } else {
            mode
        };
        let mut report = ValidationReport::new(uuid::Uuid::new_v4(), snapshot, mode);
        report.results = results;
        Ok(report)
    }

    /// `validate_all(repo) → ValidationReport`.
    pub fn validate_all(&self, ctx: &CoreContext) -> ValidatorResult<ValidationReport> {
        let rules: Vec<&Rule> = self.rule_set.rules.iter().collect();
        self.run_rules(ctx, &rules, ValidationMode::Full)
    }

    /// `validate_rules(repo, rule_ids) → ValidationReport`.
    pub fn validate_rules(&self, ctx: &CoreContext, rule_ids: &[String]) -> ValidatorResult<ValidationReport> {
        let wanted: std::collections::BTreeSet<&str> = rule_ids.iter().map(String::as_str).collect();
        let rules: Vec<&Rule> = self
            .rule_set
            .rules
            .iter()
            .filter(|r| wanted.contains(r.rule_id.as_str()))
            .collect();
        self.run_rules(ctx, &rules, ValidationMode::RuleSubset)
    }

    /// `validate_incremental(repo, change_set | null) → ValidationReport`
    /// (spec.md §4.C steps 1-6).
    pub fn validate_incremental(
        &self,
        ctx: &CoreContext,
        change_set: Option<Vec<String>>,
    ) -> ValidatorResult<ValidationReport> {
        let changed_files = match change_set {
            Some(files) => files,
            None => ctx
                .repository
                .changed_files("", "")
                .map_err(|e| ValidatorError::CorpusUnreadable(e.to_string()))?,
        };

        let seed = self.dependency_map.affected_by_files(&changed_files);
        let expanded = self.dependency_map.expand_transitive(seed);
        let affected = self.dependency_map.union_always_run(expanded);

        let total = self.rule_set.rules.len().max(1);
        let fraction = affected.len() as f64 / total as f64;
        if fraction > ctx.config.incremental_fallback_fraction {
            return self.validate_all(ctx);
        }

        let affected_rules: Vec<&Rule> = self
            .rule_set
            .rules
            .iter()
            .filter(|r| affected.contains(&r.rule_id))
            .collect();

        let mut report = self.run_rules(ctx, &affected_rules, ValidationMode::Incremental)?;

        // Unaffected rules: serve from cache when present, otherwise SKIP.
        let now = ctx.clock.now();
        for rule in &self.rule_set.rules {
            if affected.contains(&rule.rule_id) {
                continue;
            }
            let version = rule_version(rule);
            let digest = checker::evidence_digest(rule, ctx.repository.as_ref());
            match self
                .cache
                .get(&rule.rule_id, &digest, &version, ctx.config.cache_ttl_seconds, now)
            {
                Some(mut cached) => {
                    cached.cache_state = scie_core::CacheState::Cached;
                    report.results.push(cached);
                }
                None => report.results.push(scie_core::ValidationResult {
                    rule_id: rule.rule_id.clone(),
                    outcome: scie_core::Outcome::Skip,
                    severity: rule.severity,
                    message: "unaffected by change set; no cached result available".to_string(),
                    evidence: serde_json::Value::Null,
                    duration_ms: 0,
                    cache_state: scie_core::CacheState::Fresh,
                    timestamp: now,
                }),
            }
        }
        report.results.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        Ok(report)
    }
}
