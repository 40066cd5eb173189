// crates/gatewayd-startos-config/src/lib.rs
// ============================================================================
// Module: Gatewayd StartOS Config
// Description: Configuration form and dependency resolution for the gatewayd package.
// Purpose: Produce the settings schema and derive package dependencies from values.
// Dependencies: async-trait, regex, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate describes the gatewayd settings form the package-hosting
//! platform renders, and derives which other installed packages gatewayd
//! depends on from the values the operator saves. It knows nothing about the
//! platform's dependency graph; it only answers two questions:
//! - [`build`]: what does the form look like?
//! - [`resolve`]: given submitted values, what must be installed and ready?
//!
//! The [`procedures`] module composes both with the platform's
//! [`Effects`] seam.
//!
//! Invariants:
//! - [`build`] is nullary, pure, and deterministic.
//! - [`resolve`] never assumes a backend; missing tags fail closed.
//! - Masked values never reach `Debug`, logs, or error messages.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backends;
pub mod dependencies;
pub mod gateway;
pub mod identifiers;
pub mod json_schema;
pub mod pattern;
pub mod procedures;
pub mod snapshot;
pub mod spec;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backends::BackendUnion;
pub use backends::BitcoinBackend;
pub use backends::LightningBackend;
pub use dependencies::DependencyDeclaration;
pub use dependencies::MalformedConfiguration;
pub use dependencies::MalformedReason;
pub use dependencies::resolve;
pub use gateway::DEFAULT_RUST_LOG;
pub use gateway::build;
pub use identifiers::FieldName;
pub use identifiers::PackageId;
pub use identifiers::ReadinessCondition;
pub use identifiers::VariantId;
pub use json_schema::json_schema;
pub use pattern::PatternError;
pub use pattern::PatternRule;
pub use pattern::ValuePattern;
pub use procedures::ConfigResponse;
pub use procedures::Effects;
pub use procedures::ProcedureError;
pub use procedures::ProcedureOutcome;
pub use procedures::SetConfigResult;
pub use procedures::Signal;
pub use procedures::get_config;
pub use procedures::set_config;
pub use snapshot::ConfigSnapshot;
pub use snapshot::REDACTED;
pub use spec::ConfigSpec;
pub use spec::Field;
pub use spec::FieldKind;
pub use spec::FieldSpec;
pub use spec::ObjectField;
pub use spec::PointerField;
pub use spec::PointerTarget;
pub use spec::SchemaError;
pub use spec::StringField;
pub use spec::UnionField;
pub use validation::ValidationIssue;
pub use validation::ValidationReport;
pub use validation::validate;
