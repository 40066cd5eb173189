// crates/gatewayd-startos-config/src/gateway.rs
// ============================================================================
// Module: Gateway Specification Builder
// Description: The gatewayd configuration form rendered by the platform.
// Purpose: Build the checked, deterministic schema for every render request.
// Dependencies: crate::backends, crate::pattern, crate::spec
// ============================================================================

//! ## Overview
//! [`build`] assembles the gatewayd form: backend selection for Bitcoin and
//! Lightning, the dashboard password, LDK node identity, and advanced logging
//! directives. It performs no I/O and reads no clock or randomness; the only
//! injected value is [`DEFAULT_RUST_LOG`], fixed at compile time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::backends::BackendUnion;
use crate::backends::BitcoinBackend;
use crate::backends::LightningBackend;
use crate::backends::BITCOIND_PACKAGE;
use crate::backends::LND_PACKAGE;
use crate::pattern::PatternRule;
use crate::pattern::ValuePattern;
use crate::spec::ConfigSpec;
use crate::spec::Field;
use crate::spec::FieldSpec;
use crate::spec::ObjectField;
use crate::spec::PointerField;
use crate::spec::PointerTarget;
use crate::spec::SchemaError;
use crate::spec::StringField;
use crate::spec::UnionField;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Rust log directives for gatewayd.
///
/// Taken from the `GATEWAYD_DEFAULT_RUST_LOG` build environment variable,
/// falling back to `info`.
pub const DEFAULT_RUST_LOG: &str = match option_env!("GATEWAYD_DEFAULT_RUST_LOG") {
    Some(directives) => directives,
    None => "info",
};

/// Top-level field holding the dashboard password.
pub const PASSWORD_FIELD: &str = "gatewayd-password";

/// Top-level object holding LDK node identity.
pub const LDK_FIELD: &str = "gatewayd-ldk";

/// Top-level object holding advanced settings.
pub const ADVANCED_FIELD: &str = "advanced";

/// Minimum dashboard password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum node alias length announced to the Lightning network.
pub const MAX_ALIAS_LEN: usize = 32;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds the gatewayd configuration specification.
///
/// # Errors
///
/// Returns [`SchemaError`] when the assembled form violates a schema
/// invariant; no partial schema is returned.
pub fn build() -> Result<ConfigSpec, SchemaError> {
    let root = FieldSpec::new()
        .with(bitcoin_backend()?)
        .with(lightning_backend()?)
        .with(password()?)
        .with(ldk_node()?)
        .with(advanced()?);
    ConfigSpec::new(root)
}

/// Compiles a pattern, attributing failures to `path`.
fn pattern(path: &str, rule: PatternRule, description: &str) -> Result<ValuePattern, SchemaError> {
    ValuePattern::new(rule, description).map_err(|source| SchemaError::Pattern {
        path: path.to_string(),
        source,
    })
}

/// Renders a backend union from its typed variants.
fn backend_union<B: BackendUnion>(
    description: &str,
    tag_name: &str,
    variant_spec: impl Fn(B) -> Result<FieldSpec, SchemaError>,
) -> Result<Field, SchemaError> {
    let mut union = UnionField::new(B::TAG, tag_name, B::DEFAULT.id());
    for backend in B::ALL {
        union = union.with_variant(backend.id(), backend.label(), variant_spec(*backend)?);
    }
    Ok(Field::new(B::FIELD, B::DISPLAY_NAME, description, union))
}

/// Bitcoin backend selection.
fn bitcoin_backend() -> Result<Field, SchemaError> {
    backend_union::<BitcoinBackend>(
        "Choose how the Gateway connects to the Bitcoin network",
        "Backend Type",
        |backend| match backend {
            BitcoinBackend::Bitcoind => Ok(FieldSpec::new()
                .with(Field::new(
                    "user",
                    "RPC Username",
                    "The username for Bitcoin Core's RPC interface",
                    PointerField::package(BITCOIND_PACKAGE, PointerTarget::Config, "$.rpc.username"),
                ))
                .with(Field::new(
                    "password",
                    "RPC Password",
                    "The password for Bitcoin Core's RPC interface",
                    PointerField::package(BITCOIND_PACKAGE, PointerTarget::Config, "$.rpc.password"),
                ))),
            BitcoinBackend::Esplora => Ok(FieldSpec::new().with(Field::new(
                "url",
                "Esplora API URL",
                "The URL of the Esplora API to use (e.g., https://mempool.space/api)",
                StringField::new().with_default("https://mempool.space/api").with_pattern(
                    pattern(
                        "gatewayd-bitcoin-backend.esplora.url",
                        PatternRule::HttpUrl,
                        "Must be a valid HTTP(S) URL",
                    )?,
                ),
            ))),
        },
    )
}

/// Lightning backend selection.
fn lightning_backend() -> Result<Field, SchemaError> {
    backend_union::<LightningBackend>(
        "Choose which Lightning node the Gateway operates",
        "Node Implementation",
        |backend| match backend {
            LightningBackend::Ldk => Ok(FieldSpec::new()),
            LightningBackend::Lnd => Ok(FieldSpec::new()
                .with(Field::new(
                    "rpc-address",
                    "LND gRPC Address",
                    "The LAN address of LND's gRPC interface",
                    PointerField::package(LND_PACKAGE, PointerTarget::LanAddress, "grpc"),
                ))
                .with(Field::new(
                    "tls-cert-path",
                    "LND TLS Certificate",
                    "Path to LND's TLS certificate inside the Gateway container",
                    StringField::new().with_default("/mnt/lnd/tls.cert").with_pattern(pattern(
                        "gatewayd-lightning-backend.lnd.tls-cert-path",
                        PatternRule::AbsolutePath,
                        "Must be an absolute path",
                    )?),
                ))
                .with(Field::new(
                    "macaroon-path",
                    "LND Admin Macaroon",
                    "Path to LND's admin macaroon inside the Gateway container",
                    StringField::new().with_default("/mnt/lnd/admin.macaroon").with_pattern(
                        pattern(
                            "gatewayd-lightning-backend.lnd.macaroon-path",
                            PatternRule::AbsolutePath,
                            "Must be an absolute path",
                        )?,
                    ),
                ))),
        },
    )
}

/// Dashboard password.
fn password() -> Result<Field, SchemaError> {
    Ok(Field::new(
        PASSWORD_FIELD,
        "Gateway Password",
        "The admin password for accessing the Gateway dashboard (minimum 8 characters)",
        StringField::new().masked().with_pattern(pattern(
            PASSWORD_FIELD,
            PatternRule::MinLength(MIN_PASSWORD_LEN),
            "Password must be at least 8 characters",
        )?),
    ))
}

/// LDK node identity.
fn ldk_node() -> Result<Field, SchemaError> {
    let alias = Field::new(
        "alias",
        "Node Alias",
        "Public alias for this Lightning node",
        StringField::new().with_default("Fedimint LDK Gateway").with_pattern(pattern(
            "gatewayd-ldk.alias",
            PatternRule::LengthBetween {
                min: 1,
                max: MAX_ALIAS_LEN,
            },
            "Alias must be between 1 and 32 characters",
        )?),
    );
    Ok(Field::new(
        LDK_FIELD,
        "LDK Lightning Node",
        "Configuration for the integrated LDK Lightning node",
        ObjectField::new(FieldSpec::new().with(alias)),
    ))
}

/// Advanced and debugging settings.
fn advanced() -> Result<Field, SchemaError> {
    // Log directives are not restricted; the gateway reports unparsable ones.
    let log_level = Field::new(
        "rust-log-level",
        "Rust Log Directives",
        "Rust logging directives (e.g., 'info,fm=debug'). Only modify if debugging.",
        StringField::new().with_default(DEFAULT_RUST_LOG).with_pattern(pattern(
            "advanced.rust-log-level",
            PatternRule::Any,
            "Any valid Rust log directive string",
        )?),
    );
    Ok(Field::new(
        ADVANCED_FIELD,
        "Advanced Settings",
        "Optional configuration for debugging and development",
        ObjectField::new(FieldSpec::new().with(log_level)),
    ))
}
