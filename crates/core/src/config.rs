use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

/// Settings that drive one loader instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Root of the data directory (the resource tree).
    pub data_dir: PathBuf,
    /// Keep the legacy layout intact: migrate in memory only, never write to disk.
    pub legacy: bool,
    /// Probe enabled stores after loading and disable those that fail.
    pub probe_stores: bool,
    /// Default tracing filter used by binaries when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            data_dir: PathBuf::from("data"),
            legacy: false,
            probe_stores: true,
            log_filter: "info".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `GEOCAT_PROFILE`. When set (e.g. `PROD`), every key is
    /// first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("GEOCAT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = Self::default();
        Self {
            profile: p.to_string(),
            data_dir: PathBuf::from(profiled_env_or(p, "GEOCAT_DATA_DIR", "data")),
            legacy: profiled_env_bool(p, "GEOCAT_LEGACY", defaults.legacy),
            probe_stores: profiled_env_bool(p, "GEOCAT_PROBE_STORES", defaults.probe_stores),
            log_filter: profiled_env_or(p, "GEOCAT_LOG", &defaults.log_filter),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Loader config (profile: {}):", self.profile_label());
        tracing::info!("  data_dir:     {}", self.data_dir.display());
        tracing::info!("  legacy:       {}", self.legacy);
        tracing::info!("  probe_stores: {}", self.probe_stores);
    }
}
