// crates/gatewayd-startos-cli/src/lib.rs
// ============================================================================
// Module: Gatewayd StartOS CLI Library
// Description: Shared pieces of the gatewayd StartOS procedure binary.
// Purpose: Expose settings, logging, and volume effects to the binary and tests.
// Dependencies: gatewayd-startos-config, serde, tokio, toml, tracing-subscriber
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) dispatches commands; this library
//! holds the parts it wires together so they can be exercised directly.
//!
//! Security posture: settings files and stored configuration are untrusted
//! and read under size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Effects implementation over the service data volume.
pub mod effects;
/// Stderr tracing setup.
pub mod logging;
/// TOML settings for the binary.
pub mod settings;
