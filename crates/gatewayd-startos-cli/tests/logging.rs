// crates/gatewayd-startos-cli/tests/logging.rs
// ============================================================================
// Module: CLI Logging Tests
// Description: Filter selection and subscriber installation failures.
// Purpose: Ensure bad filters and double installs surface as typed errors.
// Dependencies: gatewayd-startos-cli
// ============================================================================

//! Logging tests for gatewayd-startos-cli.

use gatewayd_startos_cli::logging::LoggingError;
use gatewayd_startos_cli::logging::filter;
use gatewayd_startos_cli::logging::init;

type TestResult = Result<(), String>;

#[test]
fn environment_filter_wins_when_it_parses() -> TestResult {
    let chosen = filter(Some("debug"), "warn").map_err(|err| err.to_string())?;
    if chosen.to_string() != "debug" {
        return Err(format!("expected env filter, got {chosen}"));
    }
    Ok(())
}

#[test]
fn blank_or_invalid_environment_falls_back() -> TestResult {
    for env_value in [Some(""), Some("   "), Some("gatewayd=loudest"), None] {
        let chosen = filter(env_value, "warn").map_err(|err| err.to_string())?;
        if chosen.to_string() != "warn" {
            return Err(format!("{env_value:?} did not fall back, got {chosen}"));
        }
    }
    Ok(())
}

#[test]
fn invalid_fallback_is_a_typed_error() -> TestResult {
    match filter(None, "gatewayd=loudest") {
        Err(LoggingError::InvalidFilter {
            filter,
            ..
        }) if filter == "gatewayd=loudest" => Ok(()),
        other => Err(format!("expected invalid filter, got {other:?}")),
    }
}

#[test]
fn second_install_reports_already_initialized() -> TestResult {
    let _ = init("warn");
    match init("warn") {
        Err(LoggingError::AlreadyInitialized(_)) => Ok(()),
        other => Err(format!("expected already initialized, got {other:?}")),
    }
}
