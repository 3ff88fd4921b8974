//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SCRAPBOOK_*)
//! 2. TOML config file (if SCRAPBOOK_CONFIG_FILE set)
//! 3. Built-in defaults

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
/// 1. Environment variables (SCRAPBOOK_*)
/// 2. TOML config file (if SCRAPBOOK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for page requests. Unset means no User-Agent header.
    ///
    /// Set via SCRAPBOOK_USER_AGENT environment variable.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SCRAPBOOK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    ///
    /// Set via SCRAPBOOK_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SCRAPBOOK_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Additional attempts after a retryable fetch failure.
    ///
    /// Set via SCRAPBOOK_RETRIES environment variable.
    #[serde(default)]
    pub retries: u32,

    /// Base delay for exponential retry backoff, in milliseconds.
    ///
    /// Set via SCRAPBOOK_RETRY_BACKOFF_MS environment variable.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Parse pages served with a non-2xx status instead of failing.
    ///
    /// Set via SCRAPBOOK_ACCEPT_ERROR_STATUS environment variable.
    #[serde(default)]
    pub accept_error_status: bool,
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_retry_backoff_ms() -> u64 {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            max_bytes: default_max_bytes(),
            retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            accept_error_status: false,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry backoff base as Duration.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SCRAPBOOK_`
    /// 2. TOML file from `SCRAPBOOK_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("SCRAPBOOK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SCRAPBOOK_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        tracing::debug!(
            timeout_ms = config.timeout_ms,
            max_redirects = config.max_redirects,
            retries = config.retries,
            "configuration loaded"
        );

        Ok(config)
    }
}
