// crates/gatewayd-startos-config/src/snapshot.rs
// ============================================================================
// Module: Configuration Snapshots
// Description: Submitted configuration values and their display-safe forms.
// Purpose: Carry operator values without ever echoing masked fields.
// Dependencies: serde, serde_json, crate::spec
// ============================================================================

//! ## Overview
//! A [`ConfigSnapshot`] is the key-value tree the platform submits or
//! persists. It is an opaque interchange value: `Debug` only lists top-level
//! keys, and every display or logging path goes through
//! [`ConfigSnapshot::redacted`], which replaces masked values and
//! configuration pointers substituted by the platform.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::spec::ConfigSpec;
use crate::spec::FieldKind;
use crate::spec::FieldSpec;
use crate::spec::PointerTarget;
use crate::spec::UnionField;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder substituted for masked values in display output.
pub const REDACTED: &str = "[redacted]";

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Configuration values submitted by the platform.
///
/// # Invariants
/// - Never mutated by the resolver; treated as a read-only snapshot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot(Value);

impl ConfigSnapshot {
    /// Wraps a value tree.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Builds the default value tree for `spec`.
    ///
    /// Unions expand to their default variant; pointers and strings without a
    /// default are `null`.
    #[must_use]
    pub fn from_defaults(spec: &ConfigSpec) -> Self {
        Self(Value::Object(defaults_for(spec.root())))
    }

    /// Returns the underlying value tree.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the snapshot, returning the value tree.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns a top-level entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|object| object.get(key))
    }

    /// Returns a copy safe to display or log: masked string values and
    /// values the platform copied from another package's configuration are
    /// replaced with [`REDACTED`].
    #[must_use]
    pub fn redacted(&self, spec: &ConfigSpec) -> Value {
        let mut value = self.0.clone();
        if let Value::Object(object) = &mut value {
            redact_object(spec.root(), object);
        }
        value
    }
}

impl From<Value> for ConfigSnapshot {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self
            .0
            .as_object()
            .map(|object| object.keys().map(String::as_str).collect())
            .unwrap_or_default();
        f.debug_struct("ConfigSnapshot").field("keys", &keys).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default values for one spec level.
fn defaults_for(spec: &FieldSpec) -> Map<String, Value> {
    let mut out = Map::new();
    for field in spec {
        let value = match &field.kind {
            FieldKind::String(string) => {
                string.default.clone().map_or(Value::Null, Value::String)
            }
            FieldKind::Object(object) => Value::Object(defaults_for(&object.spec)),
            FieldKind::Union(union) => Value::Object(union_defaults(union)),
            FieldKind::Pointer(_) => Value::Null,
        };
        out.insert(field.name.to_string(), value);
    }
    out
}

/// Default value object for a union: tag plus the default variant's fields.
fn union_defaults(union: &UnionField) -> Map<String, Value> {
    let mut out = union
        .variant(union.default_variant.as_str())
        .map(|variant| defaults_for(&variant.spec))
        .unwrap_or_default();
    out.insert(union.tag.id.to_string(), Value::String(union.default_variant.to_string()));
    out
}

// ============================================================================
// SECTION: Redaction
// ============================================================================

/// Redacts masked values in one object level.
fn redact_object(spec: &FieldSpec, object: &mut Map<String, Value>) {
    for field in spec {
        let Some(value) = object.get_mut(field.name.as_str()) else {
            continue;
        };
        match &field.kind {
            FieldKind::String(string) => {
                if string.masked && !value.is_null() {
                    *value = Value::String(REDACTED.to_string());
                }
            }
            FieldKind::Object(nested) => {
                if let Value::Object(inner) = value {
                    redact_object(&nested.spec, inner);
                }
            }
            FieldKind::Union(union) => {
                if let Value::Object(inner) = value {
                    redact_union(union, inner);
                }
            }
            FieldKind::Pointer(pointer) => {
                if pointer.target == PointerTarget::Config && !value.is_null() {
                    *value = Value::String(REDACTED.to_string());
                }
            }
        }
    }
}

/// Redacts a union value. An unknown tag redacts masked fields of every
/// variant.
fn redact_union(union: &UnionField, object: &mut Map<String, Value>) {
    let selected = object
        .get(union.tag.id.as_str())
        .and_then(Value::as_str)
        .and_then(|tag| union.variant(tag));
    match selected {
        Some(variant) => redact_object(&variant.spec, object),
        None => {
            for variant in &union.variants {
                redact_object(&variant.spec, object);
            }
        }
    }
}
