// crates/gatewayd-startos-cli/src/effects.rs
// ============================================================================
// Module: Volume Effects
// Description: Effects implementation over the service data volume.
// Purpose: Persist configuration and dependency declarations for the platform.
// Dependencies: async-trait, gatewayd-startos-config, serde_json, serde_yaml, tokio
// ============================================================================

//! ## Overview
//! [`VolumeEffects`] stores the saved configuration as YAML at
//! `<root>/start9/config.yaml` and the dependency declaration as JSON at
//! `<root>/start9/depends-on.json`. Both files are staged next to their
//! destination and renamed into place. The declaration is renamed first and
//! the configuration last; the configuration rename is the commit point.
//!
//! Invariants:
//! - A missing configuration file reads as `None`.
//! - Both staged files are written and synced before either rename.
//! - A failed commit leaves `config.yaml` and `depends-on.json` as they were
//!   and removes every staged file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use gatewayd_startos_config::ConfigSnapshot;
use gatewayd_startos_config::DependencyDeclaration;
use gatewayd_startos_config::Effects;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: Layout and Limits
// ============================================================================

/// Directory under the volume root holding platform files.
pub const PLATFORM_DIR: &str = "start9";

/// Saved configuration file name.
pub const CONFIG_FILE: &str = "config.yaml";

/// Dependency declaration file name.
pub const DEPENDS_ON_FILE: &str = "depends-on.json";

/// Maximum stored configuration size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Suffix for staged files awaiting rename.
const STAGING_SUFFIX: &str = ".tmp";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Volume access failures.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// Filesystem operation failed.
    #[error("volume io error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Stored configuration exceeds [`MAX_CONFIG_FILE_SIZE`].
    #[error("stored configuration at {path} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Offending file.
        path: String,
        /// Observed size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },
    /// Stored configuration is not valid YAML.
    #[error("stored configuration at {path} is not valid yaml: {message}")]
    Decode {
        /// Offending file.
        path: String,
        /// Parser message.
        message: String,
    },
    /// Values could not be encoded for storage.
    #[error("failed to encode {path}: {message}")]
    Encode {
        /// Destination file.
        path: String,
        /// Encoder message.
        message: String,
    },
}

impl VolumeError {
    /// Wraps an I/O error with its path.
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

// ============================================================================
// SECTION: Volume Effects
// ============================================================================

/// Effects backed by files on the service data volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeEffects {
    /// Volume mount point.
    root: PathBuf,
}

impl VolumeEffects {
    /// Creates effects rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Directory holding platform files.
    #[must_use]
    pub fn platform_dir(&self) -> PathBuf {
        self.root.join(PLATFORM_DIR)
    }

    /// Saved configuration path.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.platform_dir().join(CONFIG_FILE)
    }

    /// Dependency declaration path.
    #[must_use]
    pub fn depends_on_path(&self) -> PathBuf {
        self.platform_dir().join(DEPENDS_ON_FILE)
    }
}

#[async_trait]
impl Effects for VolumeEffects {
    type Error = VolumeError;

    async fn read_config(&self) -> Result<Option<ConfigSnapshot>, Self::Error> {
        let path = self.config_path();
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved configuration");
                return Ok(None);
            }
            Err(err) => return Err(VolumeError::io(&path, err)),
        };
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(VolumeError::TooLarge {
                path: path.display().to_string(),
                size: metadata.len(),
                limit: MAX_CONFIG_FILE_SIZE,
            });
        }
        let bytes = fs::read(&path).await.map_err(|err| VolumeError::io(&path, err))?;
        let value: Value = serde_yaml::from_slice(&bytes).map_err(|err| VolumeError::Decode {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(ConfigSnapshot::new(value)))
    }

    async fn commit_config(
        &self,
        values: &ConfigSnapshot,
        depends_on: &DependencyDeclaration,
    ) -> Result<(), Self::Error> {
        let dir = self.platform_dir();
        fs::create_dir_all(&dir).await.map_err(|err| VolumeError::io(&dir, err))?;

        let config_path = self.config_path();
        let config = serde_yaml::to_string(values).map_err(|err| VolumeError::Encode {
            path: config_path.display().to_string(),
            message: err.to_string(),
        })?;
        let depends_path = self.depends_on_path();
        let mut declaration =
            serde_json::to_vec_pretty(depends_on).map_err(|err| VolumeError::Encode {
                path: depends_path.display().to_string(),
                message: err.to_string(),
            })?;
        declaration.push(b'\n');

        let previous = read_optional(&depends_path).await?;
        let staged_config = stage(&config_path, config.as_bytes()).await?;
        let staged_depends = match stage(&depends_path, &declaration).await {
            Ok(staged) => staged,
            Err(err) => {
                discard(&staged_config).await;
                return Err(err);
            }
        };
        if let Err(err) = fs::rename(&staged_depends, &depends_path).await {
            discard(&staged_depends).await;
            discard(&staged_config).await;
            return Err(VolumeError::io(&depends_path, err));
        }
        if let Err(err) = fs::rename(&staged_config, &config_path).await {
            discard(&staged_config).await;
            restore(&depends_path, previous.as_deref()).await;
            return Err(VolumeError::io(&config_path, err));
        }
        debug!(
            config = %config_path.display(),
            depends_on = %depends_path.display(),
            "configuration written to volume"
        );
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes `bytes` beside `destination` and syncs it; returns the staged path.
async fn stage(destination: &Path, bytes: &[u8]) -> Result<PathBuf, VolumeError> {
    let staged = staged_path(destination);
    let written = async {
        let mut file = fs::File::create(&staged).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }
    .await;
    if let Err(err) = written {
        discard(&staged).await;
        return Err(VolumeError::io(&staged, err));
    }
    Ok(staged)
}

/// Staged path for `destination`.
fn staged_path(destination: &Path) -> PathBuf {
    let mut staged = destination.as_os_str().to_owned();
    staged.push(STAGING_SUFFIX);
    PathBuf::from(staged)
}

/// Reads `path`, treating a missing file as `None`.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, VolumeError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(VolumeError::io(path, err)),
    }
}

/// Removes a staged file, ignoring failures.
async fn discard(staged: &Path) {
    let _ = fs::remove_file(staged).await;
}

/// Puts back the declaration that preceded a failed commit.
async fn restore(destination: &Path, previous: Option<&[u8]>) {
    let outcome = match previous {
        Some(bytes) => match stage(destination, bytes).await {
            Ok(staged) => {
                let renamed = fs::rename(&staged, destination)
                    .await
                    .map_err(|err| VolumeError::io(destination, err));
                if renamed.is_err() {
                    discard(&staged).await;
                }
                renamed
            }
            Err(err) => Err(err),
        },
        None => match fs::remove_file(destination).await {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                Err(VolumeError::io(destination, err))
            }
            _ => Ok(()),
        },
    };
    if let Err(err) = outcome {
        warn!(
            path = %destination.display(),
            error = %err,
            "failed to restore dependency declaration"
        );
    }
}
