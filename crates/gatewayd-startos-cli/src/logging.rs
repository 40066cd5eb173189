// crates/gatewayd-startos-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: tracing subscriber setup for procedure invocations.
// Purpose: Keep diagnostics on stderr so stdout carries only the result.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

use std::env;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Logging setup failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggingError {
    /// The fallback filter does not parse.
    #[error("invalid log filter `{filter}`: {message}")]
    InvalidFilter {
        /// Rejected directive string.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("logging init failed: {0}")]
    AlreadyInitialized(String),
}

/// Chooses the filter: a non-blank, parseable `env_value` wins over
/// `fallback`.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] when `fallback` is needed and does
/// not parse.
pub fn filter(env_value: Option<&str>, fallback: &str) -> Result<EnvFilter, LoggingError> {
    if let Some(directives) = env_value
        && !directives.trim().is_empty()
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return Ok(filter);
    }
    EnvFilter::try_new(fallback).map_err(|err| LoggingError::InvalidFilter {
        filter: fallback.to_string(),
        message: err.to_string(),
    })
}

/// Installs the global stderr subscriber.
///
/// `RUST_LOG` takes precedence over `fallback`.
///
/// # Errors
///
/// Returns [`LoggingError`] when `fallback` is not a valid filter or a
/// subscriber is already installed.
pub fn init(fallback: &str) -> Result<(), LoggingError> {
    let env_value = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter(env_value.as_deref(), fallback)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LoggingError::AlreadyInitialized(err.to_string()))
}
