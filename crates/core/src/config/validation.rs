//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name`, `sync_tag` or `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - a `precache` entry is not root-relative
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        self.origin_url()?;

        if let Some(bad) = self.precache.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "precache".into(),
                reason: format!("{bad:?} must be a root-relative path"),
            });
        }

        if self.api_host_markers.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::Invalid {
                field: "api_host_markers".into(),
                reason: "markers must not be empty strings".into(),
            });
        }

        if self.sync_tag.is_empty() {
            return Err(ConfigError::Invalid { field: "sync_tag".into(), reason: "must not be empty".into() });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.precache.is_empty() {
            tracing::warn!(cache_name = %self.cache_name, "precache manifest is empty; offline shell will not be available");
        }

        Ok(())
    }
}
