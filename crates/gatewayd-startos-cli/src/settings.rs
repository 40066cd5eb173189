// crates/gatewayd-startos-cli/src/settings.rs
// ============================================================================
// Module: CLI Settings
// Description: TOML settings for the procedure entry point.
// Purpose: Locate the service volume and default log filter with strict limits.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Settings are optional. A path passed on the command line wins, then the
//! [`SETTINGS_ENV_VAR`] environment variable; with neither, defaults apply.
//! A path that is named but unreadable is an error rather than a silent
//! fallback.
//!
//! Security posture: settings files are untrusted input. They are size-capped,
//! must be UTF-8, and reject unknown keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Environment variable naming the settings file.
pub const SETTINGS_ENV_VAR: &str = "GATEWAYD_STARTOS_SETTINGS";

/// Maximum settings file size in bytes.
pub const MAX_SETTINGS_FILE_SIZE: usize = 64 * 1024;

/// Maximum accepted settings path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Default service data volume mount.
pub const DEFAULT_VOLUME_ROOT: &str = "/root";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: Settings
// ============================================================================

/// CLI settings loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    /// Service data volume.
    pub volume: VolumeSettings,
    /// Logging defaults.
    pub logging: LoggingSettings,
}

/// `[volume]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeSettings {
    /// Mount point of the service data volume.
    pub root: PathBuf,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_VOLUME_ROOT),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CliSettings {
    /// Loads settings from `path`, the environment, or defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a named settings file cannot be read,
    /// parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match resolve_path(path, env::var_os(SETTINGS_ENV_VAR))? {
            Some(resolved) => Self::load_file(&resolved),
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the file is unreadable, oversized, not
    /// UTF-8, malformed, or invalid.
    pub fn load_file(path: &Path) -> Result<Self, SettingsError> {
        let bytes = fs::read(path).map_err(|err| SettingsError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        if bytes.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(SettingsError::TooLarge {
                size: bytes.len(),
                limit: MAX_SETTINGS_FILE_SIZE,
            });
        }
        let content = std::str::from_utf8(&bytes).map_err(|_| SettingsError::NotUtf8)?;
        Self::from_toml(content)
    }

    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] or [`SettingsError::Invalid`].
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            toml::from_str(content).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks cross-field constraints.
    fn validate(&self) -> Result<(), SettingsError> {
        if !self.volume.root.is_absolute() {
            return Err(SettingsError::Invalid("volume.root must be an absolute path".to_string()));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(SettingsError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Settings loading or validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// I/O failure while reading a named settings file.
    #[error("settings io error at {path}: {message}")]
    Io {
        /// File that failed to read.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Settings file exceeds [`MAX_SETTINGS_FILE_SIZE`].
    #[error("settings file is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
    /// Settings file is not UTF-8.
    #[error("settings file must be utf-8")]
    NotUtf8,
    /// TOML parsing error.
    #[error("settings parse error: {0}")]
    Parse(String),
    /// Invalid settings data.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the settings path from the CLI flag or the environment value.
///
/// # Errors
///
/// Returns [`SettingsError::Invalid`] when the environment path is empty or
/// too long.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<Option<PathBuf>, SettingsError> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    let Some(value) = env_value else {
        return Ok(None);
    };
    if value.is_empty() {
        return Err(SettingsError::Invalid(format!("{SETTINGS_ENV_VAR} is set but empty")));
    }
    if value.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SettingsError::Invalid("settings path exceeds max length".to_string()));
    }
    Ok(Some(PathBuf::from(value)))
}
