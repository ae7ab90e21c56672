//! Configuration surface (spec.md §6 "Configuration surface").
//!
//! TOML file, overridden by `SCIE_*` environment variables, modeled on
//! `knhk-config`'s `config.rs`/`env.rs` split (minus its `no_std` path,
//! which this engine has no use for).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityWeights {
    pub w_x: f64,
    pub w_y: f64,
    pub w_z: f64,
}

impl Default for IntegrityWeights {
    fn default() -> Self {
        Self { w_x: 1.0, w_y: 1.0, w_z: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cycle_interval_seconds: u64,
    pub worker_count: usize,
    pub cache_ttl_seconds: u64,
    pub incremental_fallback_fraction: f64,
    pub setpoint: f64,
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,
    pub u_max: f64,
    pub i_max: f64,
    pub window_size: usize,
    pub detection_rate_floor: f64,
    pub mi_threshold: f64,
    pub density_threshold: f64,
    pub max_links_per_cluster: usize,
    pub rule_check_timeout_seconds: u64,
    pub worm_lock_timeout_seconds: u64,
    pub integrity_weights: IntegrityWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_interval_seconds: 300,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            cache_ttl_seconds: 60,
            incremental_fallback_fraction: 0.78,
            setpoint: 0.70,
            k_p: 0.4,
            k_i: 0.05,
            k_d: 0.1,
            u_max: 0.05,
            i_max: 0.15,
            window_size: 30,
            detection_rate_floor: 0.98,
            mi_threshold: 0.5,
            density_threshold: 0.05,
            max_links_per_cluster: 10,
            rule_check_timeout_seconds: 300,
            worm_lock_timeout_seconds: 30,
            integrity_weights: IntegrityWeights::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    pub fn load(path: Option<&std::path::Path>) -> Result<Self, crate::error::CoreError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let text = std::fs::read_to_string(p)?;
                Self::from_toml_str(&text)
                    .map_err(|e| crate::error::CoreError::Config(e.to_string()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Overrides recognized `SCIE_<FIELD>` environment variables
    /// (spec.md §6 table), matching `knhk-config::env::apply_env_overrides`.
    pub fn apply_env_overrides(&mut self) {
        macro_rules! override_numeric {
            ($field:ident, $env:literal) => {
                if let Ok(v) = std::env::var($env) {
                    if let Ok(parsed) = v.parse() {
                        self.$field = parsed;
                    }
                }
            };
        }
        override_numeric!(cycle_interval_seconds, "SCIE_CYCLE_INTERVAL_SECONDS");
        override_numeric!(worker_count, "SCIE_WORKER_COUNT");
        override_numeric!(cache_ttl_seconds, "SCIE_CACHE_TTL_SECONDS");
        override_numeric!(
            incremental_fallback_fraction,
            "SCIE_INCREMENTAL_FALLBACK_FRACTION"
        );
        override_numeric!(setpoint, "SCIE_SETPOINT");
        override_numeric!(k_p, "SCIE_K_P");
        override_numeric!(k_i, "SCIE_K_I");
        override_numeric!(k_d, "SCIE_K_D");
        override_numeric!(u_max, "SCIE_U_MAX");
        override_numeric!(i_max, "SCIE_I_MAX");
        override_numeric!(window_size, "SCIE_WINDOW_SIZE");
        override_numeric!(detection_rate_floor, "SCIE_DETECTION_RATE_FLOOR");
        override_numeric!(mi_threshold, "SCIE_MI_THRESHOLD");
        override_numeric!(density_threshold, "SCIE_DENSITY_THRESHOLD");
    }
}
