// crates/gatewayd-startos-config/src/procedures.rs
// ============================================================================
// Module: Platform Procedures
// Description: Get-config and set-config procedures over a platform effects seam.
// Purpose: Compose the pure builder and resolver with the platform's I/O.
// Dependencies: async-trait, serde, thiserror, tracing, crate::*
// ============================================================================

//! ## Overview
//! The platform invokes two procedures. [`get_config`] renders the form and
//! pairs it with the persisted values. [`set_config`] resolves dependencies
//! from submitted values and hands both to the platform in a single
//! [`Effects::commit_config`] call.
//!
//! Invariants:
//! - Resolution finishes before any effects call; a malformed submission
//!   makes no effects call at all.
//! - The commit is the only suspension point. If it fails, the resolved
//!   declaration is dropped and the platform's error is returned unchanged.
//! - No retries, timeouts, or locking live here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::dependencies::DependencyDeclaration;
use crate::dependencies::MalformedConfiguration;
use crate::dependencies::resolve;
use crate::gateway;
use crate::snapshot::ConfigSnapshot;
use crate::spec::ConfigSpec;
use crate::spec::SchemaError;

// ============================================================================
// SECTION: Effects
// ============================================================================

/// Capabilities the platform lends to a procedure invocation.
///
/// The procedures forward the handle without inspecting it.
#[async_trait]
pub trait Effects: Send + Sync {
    /// Platform error type, propagated unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the persisted configuration, if any has been saved.
    async fn read_config(&self) -> Result<Option<ConfigSnapshot>, Self::Error>;

    /// Persists `values` and registers `depends_on` with the platform.
    async fn commit_config(
        &self,
        values: &ConfigSnapshot,
        depends_on: &DependencyDeclaration,
    ) -> Result<(), Self::Error>;
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Signal the platform sends the service after a configuration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    /// Terminate so the service restarts with the new configuration.
    #[serde(rename = "SIGTERM")]
    Sigterm,
}

/// Output of [`get_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigResponse {
    /// Persisted values, or `None` before the first save.
    pub config: Option<ConfigSnapshot>,
    /// Form specification.
    pub spec: ConfigSpec,
}

/// Output of [`set_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SetConfigResult {
    /// Signal to deliver to the running service.
    pub signal: Option<Signal>,
    /// Dependencies registered with the platform.
    pub depends_on: DependencyDeclaration,
}

/// Procedure failures.
///
/// # Invariants
/// - `Platform` carries the effects error as-is.
#[derive(Debug, Error)]
pub enum ProcedureError<E: std::error::Error + 'static> {
    /// The form specification violates a schema invariant.
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    /// Submitted values lack or corrupt a backend selection.
    #[error(transparent)]
    MalformedConfiguration(#[from] MalformedConfiguration),
    /// The platform's own operation failed.
    #[error(transparent)]
    Platform(E),
}

// ============================================================================
// SECTION: Procedures
// ============================================================================

/// Renders the form together with the persisted values.
///
/// # Errors
///
/// Returns [`ProcedureError::InvalidSchema`] when the form cannot be built and
/// [`ProcedureError::Platform`] when reading persisted values fails.
pub async fn get_config<E: Effects>(
    effects: &E,
) -> Result<ConfigResponse, ProcedureError<E::Error>> {
    let spec = gateway::build()?;
    let config = effects.read_config().await.map_err(ProcedureError::Platform)?;
    Ok(ConfigResponse {
        config,
        spec,
    })
}

/// Resolves dependencies for `values` and commits both through `effects`.
///
/// # Errors
///
/// Returns [`ProcedureError::MalformedConfiguration`] before any effects call
/// when a backend selection is missing, and [`ProcedureError::Platform`] when
/// the commit fails.
pub async fn set_config<E: Effects>(
    effects: &E,
    values: ConfigSnapshot,
) -> Result<SetConfigResult, ProcedureError<E::Error>> {
    let depends_on = resolve(&values)?;
    effects.commit_config(&values, &depends_on).await.map_err(ProcedureError::Platform)?;
    info!(dependencies = depends_on.len(), "configuration committed");
    Ok(SetConfigResult {
        signal: Some(Signal::Sigterm),
        depends_on,
    })
}

// ============================================================================
// SECTION: Wire Envelope
// ============================================================================

/// Result envelope returned to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcedureOutcome<T> {
    /// Successful procedure output.
    Result(T),
    /// Failure message.
    Error(String),
}

impl<T, E: std::error::Error> From<Result<T, E>> for ProcedureOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Result(value),
            Err(err) => Self::Error(err.to_string()),
        }
    }
}
