// crates/gatewayd-startos-config/src/backends.rs
// ============================================================================
// Module: Backend Selectors
// Description: Typed variants of the gateway's backend-selection unions.
// Purpose: Share one variant list between the schema builder and the resolver.
// Dependencies: crate::identifiers
// ============================================================================

//! ## Overview
//! The gateway exposes two backend-selection unions: how it reaches the
//! Bitcoin network and which Lightning node it drives. Each union is an enum
//! implementing [`BackendUnion`]. The schema builder renders its variants from
//! [`BackendUnion::ALL`], and the resolver maps a selected variant to its
//! package dependency through [`BackendUnion::dependency`], an exhaustive
//! match. A new backend therefore cannot be added to the form without
//! deciding its dependency.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::identifiers::PackageId;
use crate::identifiers::ReadinessCondition;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Package id of the Bitcoin Core service.
pub const BITCOIND_PACKAGE: &str = "bitcoind";

/// Package id of the LND service.
pub const LND_PACKAGE: &str = "lnd";

/// Tag field shared by both backend unions.
pub const BACKEND_TAG: &str = "backend-type";

// ============================================================================
// SECTION: Backend Union Trait
// ============================================================================

/// Another installed package a backend variant requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPackage {
    /// Depended-on package.
    pub package_id: PackageId,
    /// Condition the package must satisfy.
    pub condition: ReadinessCondition,
}

/// A backend-selection union rendered into the schema and read back from
/// submitted values.
pub trait BackendUnion: Copy + Eq + 'static {
    /// Top-level field holding the union.
    const FIELD: &'static str;
    /// Display label of the union field.
    const DISPLAY_NAME: &'static str;
    /// Tag sub-field holding the selected variant.
    const TAG: &'static str = BACKEND_TAG;
    /// Every variant in rendering order.
    const ALL: &'static [Self];
    /// Variant selected by default.
    const DEFAULT: Self;

    /// Variant id stored in the tag field.
    fn id(self) -> &'static str;

    /// Operator-facing variant label.
    fn label(self) -> &'static str;

    /// Package dependency introduced by selecting this variant.
    fn dependency(self) -> Option<RequiredPackage>;

    /// Parses a variant id.
    #[must_use]
    fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|backend| backend.id() == id)
    }
}

// ============================================================================
// SECTION: Bitcoin Backend
// ============================================================================

/// How the gateway reaches the Bitcoin network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitcoinBackend {
    /// A Bitcoin Core package installed on the same server.
    Bitcoind,
    /// A remote Esplora HTTP API.
    Esplora,
}

impl BackendUnion for BitcoinBackend {
    const ALL: &'static [Self] = &[Self::Bitcoind, Self::Esplora];
    const DEFAULT: Self = Self::Bitcoind;
    const DISPLAY_NAME: &'static str = "Bitcoin Backend";
    const FIELD: &'static str = "gatewayd-bitcoin-backend";

    fn id(self) -> &'static str {
        match self {
            Self::Bitcoind => "bitcoind",
            Self::Esplora => "esplora",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Bitcoind => "Bitcoin Core (Recommended)",
            Self::Esplora => "Esplora",
        }
    }

    fn dependency(self) -> Option<RequiredPackage> {
        // bitcoind credentials arrive through pointers the platform resolves.
        match self {
            Self::Bitcoind | Self::Esplora => None,
        }
    }
}

// ============================================================================
// SECTION: Lightning Backend
// ============================================================================

/// Which Lightning node the gateway drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightningBackend {
    /// LDK node embedded in the gateway process.
    Ldk,
    /// A separately installed LND package.
    Lnd,
}

impl BackendUnion for LightningBackend {
    const ALL: &'static [Self] = &[Self::Ldk, Self::Lnd];
    const DEFAULT: Self = Self::Ldk;
    const DISPLAY_NAME: &'static str = "Lightning Backend";
    const FIELD: &'static str = "gatewayd-lightning-backend";

    fn id(self) -> &'static str {
        match self {
            Self::Ldk => "ldk",
            Self::Lnd => "lnd",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Ldk => "LDK (Embedded)",
            Self::Lnd => "LND",
        }
    }

    fn dependency(self) -> Option<RequiredPackage> {
        match self {
            Self::Ldk => None,
            Self::Lnd => Some(RequiredPackage {
                package_id: PackageId::new(LND_PACKAGE),
                condition: ReadinessCondition::synced(),
            }),
        }
    }
}
