// crates/gatewayd-startos-config/src/dependencies.rs
// ============================================================================
// Module: Dependency Resolver
// Description: Derives the gateway's package dependencies from submitted values.
// Purpose: Map the selected backend variants to readiness requirements.
// Dependencies: serde, thiserror, tracing, crate::backends, crate::snapshot
// ============================================================================

//! ## Overview
//! [`resolve`] reads the selected variant of each backend union from a
//! submitted snapshot and folds their [`BackendUnion::dependency`] entries
//! into a fresh [`DependencyDeclaration`]. A missing or unknown tag is a
//! [`MalformedConfiguration`]; no default variant is assumed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::backends::BackendUnion;
use crate::backends::BitcoinBackend;
use crate::backends::LightningBackend;
use crate::backends::RequiredPackage;
use crate::identifiers::PackageId;
use crate::identifiers::ReadinessCondition;
use crate::snapshot::ConfigSnapshot;

// ============================================================================
// SECTION: Dependency Declaration
// ============================================================================

/// Depended-on packages and the readiness conditions each must satisfy.
///
/// # Invariants
/// - Built fresh per resolution; never persisted by this crate.
/// - Keys and condition sets are ordered for stable serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyDeclaration(BTreeMap<PackageId, BTreeSet<ReadinessCondition>>);

impl DependencyDeclaration {
    /// Creates an empty declaration.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a required condition for a package.
    pub fn require(&mut self, package_id: PackageId, condition: ReadinessCondition) {
        self.0.entry(package_id).or_default().insert(condition);
    }

    /// Returns the conditions required of `package_id`.
    #[must_use]
    pub fn conditions(&self, package_id: &str) -> Option<&BTreeSet<ReadinessCondition>> {
        self.0.get(package_id)
    }

    /// Iterates entries in package order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageId, &BTreeSet<ReadinessCondition>)> {
        self.0.iter()
    }

    /// Returns the number of depended-on packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no package is depended on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<RequiredPackage> for DependencyDeclaration {
    fn extend<T: IntoIterator<Item = RequiredPackage>>(&mut self, iter: T) {
        for required in iter {
            self.require(required.package_id, required.condition);
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a submitted snapshot could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The snapshot root is not an object.
    NotAnObject,
    /// The union field is absent or not an object.
    MissingUnion,
    /// The union object has no tag entry.
    MissingTag,
    /// The tag entry is not a string.
    TagNotString,
    /// The tag names no known variant.
    UnknownVariant(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("configuration is not an object"),
            Self::MissingUnion => f.write_str("backend selection is missing"),
            Self::MissingTag => f.write_str("variant tag is missing"),
            Self::TagNotString => f.write_str("variant tag is not a string"),
            Self::UnknownVariant(variant) => write!(f, "unknown variant `{variant}`"),
        }
    }
}

/// Submitted values lack or corrupt a backend selection.
///
/// # Invariants
/// - Never retried automatically; the operator must correct the submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed configuration at `{path}`: {reason}")]
pub struct MalformedConfiguration {
    /// Dotted path of the offending entry.
    pub path: String,
    /// What is wrong with it.
    pub reason: MalformedReason,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the dependency declaration for a submitted snapshot.
///
/// # Errors
///
/// Returns [`MalformedConfiguration`] when a backend union or its tag is
/// missing, mistyped, or names no known variant.
pub fn resolve(values: &ConfigSnapshot) -> Result<DependencyDeclaration, MalformedConfiguration> {
    let bitcoin = selected::<BitcoinBackend>(values)?;
    let lightning = selected::<LightningBackend>(values)?;
    let mut declaration = DependencyDeclaration::new();
    declaration.extend(bitcoin.dependency());
    declaration.extend(lightning.dependency());
    debug!(
        bitcoin_backend = bitcoin.id(),
        lightning_backend = lightning.id(),
        dependencies = declaration.len(),
        "resolved gateway dependencies"
    );
    Ok(declaration)
}

/// Reads the selected variant of union `B`.
///
/// # Errors
///
/// Returns [`MalformedConfiguration`] when the selection cannot be read.
pub fn selected<B: BackendUnion>(values: &ConfigSnapshot) -> Result<B, MalformedConfiguration> {
    let malformed = |path: String, reason| MalformedConfiguration {
        path,
        reason,
    };
    let tag_path = format!("{}.{}", B::FIELD, B::TAG);
    if !values.as_value().is_object() {
        return Err(malformed("$".to_string(), MalformedReason::NotAnObject));
    }
    let union = values
        .get(B::FIELD)
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(B::FIELD.to_string(), MalformedReason::MissingUnion))?;
    let tag = match union.get(B::TAG) {
        None | Some(Value::Null) => return Err(malformed(tag_path, MalformedReason::MissingTag)),
        Some(Value::String(tag)) => tag,
        Some(_) => return Err(malformed(tag_path, MalformedReason::TagNotString)),
    };
    B::from_id(tag).ok_or_else(|| malformed(tag_path, MalformedReason::UnknownVariant(tag.clone())))
}
