//! Configuration data structures for the fintrack client.
//!
//! This module defines the schema for the application settings: backend API
//! location, token storage, response caching and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Backend REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the access/refresh token pair lives on disk.
    #[serde(default)]
    pub storage: StorageConfig,

    /// In-memory response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all resource paths are appended to.
    /// Default: `http://localhost:8001/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds.
    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Settings for persisted credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the JSON token file.
    /// Default: `~/.fintrack/tokens.json`
    #[serde(default = "default_tokens_path")]
    pub tokens_path: String,
}

/// Settings for the dashboard response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether dashboard reads are served from the cache.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lifetime of cached dashboard responses, in milliseconds.
    /// Default: `300000` (5 minutes)
    #[serde(default = "default_dashboard_ttl")]
    pub dashboard_ttl_ms: u64,

    /// Drop cached dashboard aggregates after a successful write.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub invalidate_on_write: bool,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `warn`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tokens_path: default_tokens_path(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dashboard_ttl_ms: default_dashboard_ttl(),
            invalidate_on_write: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults
fn default_base_url() -> String {
    "http://localhost:8001/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_tokens_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".fintrack")
        .join("tokens.json")
        .to_string_lossy()
        .to_string()
}

fn default_true() -> bool {
    true
}

fn default_dashboard_ttl() -> u64 {
    300_000 // 5 minutes
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
