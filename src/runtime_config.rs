// =============================================================================
// Runtime Configuration: service settings with env overrides
// =============================================================================
//
// Every tunable lives here. Settings are read from an optional JSON file, then
// selected fields are overridden from the environment (after `.env` has been
// loaded by `main`).
//
// All fields carry `#[serde(default)]` so that a partial or empty file still
// deserialises.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::staleness::DEFAULT_FRESHNESS;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_base_url() -> String {
    "https://www.alphavantage.co".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:5001".to_string()
}

fn default_freshness_secs() -> u64 {
    DEFAULT_FRESHNESS.as_secs()
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_series_timeout_secs() -> u64 {
    10
}

fn default_quote_timeout_secs() -> u64 {
    5
}

// =============================================================================
// ServiceConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    // --- Upstream provider ---------------------------------------------------

    /// Provider API key. Never logged.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Retries after the first attempt when the provider answers 502/503/504.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubles on each further retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Timeout for daily series and indicator lookups.
    #[serde(default = "default_series_timeout_secs")]
    pub series_timeout_secs: u64,

    /// Timeout for quote lookups.
    #[serde(default = "default_quote_timeout_secs")]
    pub quote_timeout_secs: u64,

    // --- Cache --------------------------------------------------------------

    /// Directory for on-disk cache artifacts. `None` keeps the cache in memory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// Serialise concurrent refreshes of the same key into one upstream fetch.
    #[serde(default)]
    pub single_flight: bool,

    // --- HTTP surface -------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            series_timeout_secs: default_series_timeout_secs(),
            quote_timeout_secs: default_quote_timeout_secs(),
            cache_dir: None,
            freshness_secs: default_freshness_secs(),
            single_flight: false,
            bind_addr: default_bind_addr(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;

        info!(
            path = %path.display(),
            base_url = %config.base_url,
            freshness_secs = config.freshness_secs,
            "service config loaded"
        );

        Ok(config)
    }

    /// Apply `ADVISOR_*` environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ADVISOR_API_KEY") {
            self.api_key = key;
        }
        if let Some(addr) = lookup("ADVISOR_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = lookup("ADVISOR_BASE_URL") {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("ADVISOR_CACHE_DIR") {
            let dir = dir.trim();
            self.cache_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn series_timeout(&self) -> Duration {
        Duration::from_secs(self.series_timeout_secs)
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(self.quote_timeout_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.freshness(), Duration::from_secs(300));
        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.backoff_base(), Duration::from_secs(1));
        assert_eq!(cfg.series_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.quote_timeout(), Duration::from_secs(5));
        assert!(cfg.cache_dir.is_none());
        assert!(!cfg.single_flight);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "freshness_secs": 60, "single_flight": true }"#;
        let cfg: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.freshness_secs, 60);
        assert!(cfg.single_flight);
        assert_eq!(cfg.bind_addr, "127.0.0.1:5001");
        assert_eq!(cfg.base_url, "https://www.alphavantage.co");
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_overrides(|name| match name {
            "ADVISOR_API_KEY" => Some("secret".into()),
            "ADVISOR_BASE_URL" => Some("http://localhost:9000/".into()),
            "ADVISOR_CACHE_DIR" => Some("cache".into()),
            _ => None,
        });
        assert_eq!(cfg.api_key, "secret");
        assert_eq!(cfg.base_url, "http://localhost:9000");
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("cache")));
        assert_eq!(cfg.bind_addr, "127.0.0.1:5001");
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(ServiceConfig::load("/definitely/not/here.json").is_err());
    }
}
