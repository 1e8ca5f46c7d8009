//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to prevent
//! bearer credentials from leaking into logs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{ApiError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for ingestion.
/// - `pretty` (default): Human-readable, colorized output.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ApiError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
        }
    }
    .map_err(|e| ApiError::Config(format!("Failed to install log subscriber: {}", e)))
}

static BEARER_REGEX: OnceLock<Regex> = OnceLock::new();
static JWT_REGEX: OnceLock<Regex> = OnceLock::new();

fn bearer_regex() -> &'static Regex {
    BEARER_REGEX.get_or_init(|| {
        Regex::new(r#"(Bearer )[^\s"',}]+"#).expect("Invalid bearer regex pattern")
    })
}

fn jwt_regex() -> &'static Regex {
    JWT_REGEX.get_or_init(|| {
        Regex::new(r"eyJ[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*").expect("Invalid JWT regex pattern")
    })
}

/// Sanitizes credentials from log messages.
///
/// Replaces the value following `Bearer ` and any JWT-shaped token (base64url
/// segments starting with `eyJ`) with a `[REDACTED]` placeholder.
pub fn sanitize(input: &str) -> String {
    let without_bearer = bearer_regex().replace_all(input, "${1}[REDACTED]");
    jwt_regex()
        .replace_all(&without_bearer, "[REDACTED]")
        .into_owned()
}
