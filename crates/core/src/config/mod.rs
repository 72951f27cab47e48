//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SISGATE_SW_*)
//! 2. TOML config file (if SISGATE_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SISGATE_SW_*)
/// 2. TOML config file (if SISGATE_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the cache buckets.
    ///
    /// Set via SISGATE_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Name of the current cache bucket. Bumping it invalidates every
    /// previously cached asset on the next activation.
    ///
    /// Set via SISGATE_SW_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Origin the application shell is served from; root-relative paths
    /// resolve against it.
    ///
    /// Set via SISGATE_SW_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Root-relative paths fetched and stored at install time.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Host substrings identifying the hosted backend API.
    #[serde(default = "default_api_host_markers")]
    pub api_host_markers: Vec<String>,

    /// Background-sync tag the worker answers to.
    ///
    /// Set via SISGATE_SW_SYNC_TAG environment variable.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SISGATE_SW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per response.
    ///
    /// Set via SISGATE_SW_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SISGATE_SW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sisgate-hub-cache.sqlite")
}

fn default_cache_name() -> String {
    "sisgate-hub-v1".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/index.html", "/manifest.json", "/favicon.ico"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_host_markers() -> Vec<String> {
    vec!["supabase.co".into()]
}

fn default_sync_tag() -> String {
    "sync-pending-changes".into()
}

fn default_user_agent() -> String {
    "sisgate-sw/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            origin: default_origin(),
            precache: default_precache(),
            api_host_markers: default_api_host_markers(),
            sync_tag: default_sync_tag(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let parsed = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme {other}") }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SISGATE_SW_`
    /// 2. TOML file from `SISGATE_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SISGATE_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SISGATE_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
