//! Result cache (spec.md §4.C "Result cache"), grounded on
//! `knhk-workflow-engine::cache::ReflexCache`'s `DashMap`-backed hot cache.
//!
//! Keyed by `(rule_id, repository_snapshot_digest, rule_version)`. TTL only
//! applies when the snapshot digest is unavailable (empty string); entries
//! are rejected outright if the rule's own version no longer matches.

use dashmap::DashMap;
use scie_core::ValidationResult;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    rule_id: String,
    snapshot_digest: String,
    rule_version: String,
}

struct CacheEntry {
    result: ValidationResult,
    written_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Clone)]
pub struct ResultCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self { entries: Arc::new(DashMap::new()) }
    }

    pub fn get(
        &self,
        rule_id: &str,
        snapshot_digest: &str,
        rule_version: &str,
        ttl_seconds: u64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<ValidationResult> {
        let key = CacheKey {
            rule_id: rule_id.to_string(),
            snapshot_digest: snapshot_digest.to_string(),
            rule_version: rule_version.to_string(),
        };
        let entry = self.entries.get(&key)?;
        if snapshot_digest.is_empty() {
            let age = (now - entry.written_at).num_seconds();
            if age < 0 || age as u64 > ttl_seconds {
                return None;
            }
        }
        Some(entry.result.clone())
    }

    pub fn put(
        &self,
        rule_id: &str,
        snapshot_digest: &str,
        rule_version: &str,
        result: ValidationResult,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let key = CacheKey {
            rule_id: rule_id.to_string(),
            snapshot_digest: snapshot_digest.to_string(),
            rule_version: rule_version.to_string(),
        };
        self.entries.insert(key, CacheEntry { result, written_at: now });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scie_core::{CacheState, Outcome, Severity};

    fn sample(rule_id: &str) -> ValidationResult {
        ValidationResult {
            rule_id: rule_id.to_string(),
            outcome: Outcome::Pass,
            severity: Severity::Low,
            message: String::new(),
            evidence: serde_json::Value::Null,
            duration_ms: 1,
            cache_state: CacheState::Fresh,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn hit_with_matching_digest_ignores_ttl() {
        let cache = ResultCache::new();
        let now = chrono::Utc::now();
        cache.put("R-1", "digest-a", "v1", sample("R-1"), now - chrono::Duration::seconds(1_000_000));
        let hit = cache.get("R-1", "digest-a", "v1", 60, now);
        assert!(hit.is_some());
    }

    #[test]
    fn miss_when_rule_version_changed() {
        let cache = ResultCache::new();
        let now = chrono::Utc::now();
        cache.put("R-1", "digest-a", "v1", sample("R-1"), now);
        assert!(cache.get("R-1", "digest-a", "v2", 60, now).is_none());
    }

    #[test]
    fn ttl_expiry_when_digest_unavailable() {
        let cache = ResultCache::new();
        let now = chrono::Utc::now();
        cache.put("R-1", "", "v1", sample("R-1"), now - chrono::Duration::seconds(120));
        assert!(cache.get("R-1", "", "v1", 60, now).is_none());
    }
}
