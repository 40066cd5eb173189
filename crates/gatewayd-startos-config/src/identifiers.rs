// crates/gatewayd-startos-config/src/identifiers.rs
// ============================================================================
// Module: Configuration Identifiers
// Description: Opaque identifiers for packages, fields, variants, and conditions.
// Purpose: Keep schema keys and dependency keys strongly typed on the wire.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers serialize as plain strings so the schema and dependency
//! declarations match the platform interchange format byte for byte. No
//! validation happens here; [`crate::ConfigSpec::new`] rejects empty names when
//! a schema is assembled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a transparent string identifier with the shared accessor set.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_identifier! {
    /// Identifier of an installed service package (`bitcoind`, `lnd`).
    ///
    /// # Invariants
    /// - Opaque UTF-8 string; matches the platform's package id verbatim.
    PackageId
}

string_identifier! {
    /// Key of a field inside an object or variant spec.
    ///
    /// # Invariants
    /// - Unique within its enclosing spec once the schema is assembled.
    FieldName
}

string_identifier! {
    /// Key of a tagged-union variant.
    ///
    /// # Invariants
    /// - Stored in the union tag field of a submitted snapshot.
    VariantId
}

string_identifier! {
    /// Named readiness predicate a depended-on package must satisfy.
    ReadinessCondition
}

impl ReadinessCondition {
    /// The dependency is fully synchronized with its network.
    #[must_use]
    pub fn synced() -> Self {
        Self::new("synced")
    }
}
