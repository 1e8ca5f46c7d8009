//! File-backed token storage.
//!
//! Tokens are kept in a small JSON file that must only be readable by its owner.
//! An in-memory mirror answers reads so that the per-request token lookup never
//! touches the disk.

// Author: kelexine (https://github.com/kelexine)

use super::{AuthTokens, StoredTokens, TokenStore};
use crate::error::{ApiError, Result};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Token store persisting to a JSON file with 0600 permissions.
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<StoredTokens>,
}

impl FileTokenStore {
    /// Opens the store at `path`, loading any tokens already persisted there.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the file exists but is malformed or has
    /// insecure permissions.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cached = Self::load(&path)?;

        debug!(
            "Opened token store at {} (tokens present: {})",
            path.display(),
            !cached.is_empty()
        );

        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<StoredTokens> {
        if !path.exists() {
            return Ok(StoredTokens::default());
        }

        // Refuse to trust a token file other users can read.
        Self::validate_permissions(path)?;

        let contents = fs::read_to_string(path)
            .map_err(|e| ApiError::Storage(format!("Failed to read token file: {}", e)))?;

        if contents.trim().is_empty() {
            return Ok(StoredTokens::default());
        }

        serde_json::from_str(&contents)
            .map_err(|e| ApiError::Storage(format!("Invalid token file format: {}", e)))
    }

    /// Ensures that the token file has secure permissions (0600 or 0400).
    fn validate_permissions(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            let mode = fs::metadata(path)?.permissions().mode() & 0o777;

            if mode != 0o600 && mode != 0o400 {
                warn!(
                    "Insecure permissions on {}: {:o} (expected 0600)",
                    path.display(),
                    mode
                );
                return Err(ApiError::Storage(format!(
                    "Insecure file permissions: {:o}. Token files must be 0600 (rw-------).",
                    mode
                )));
            }
        }

        Ok(())
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        if tokens.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ApiError::Storage(format!(
                    "Failed to remove token file: {}",
                    e
                ))),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(tokens)?;
        write_private(&self.path, json.as_bytes())
            .map_err(|e| ApiError::Storage(format!("Disk write failure: {}", e)))
    }

    /// Apply `update` to the mirror and persist the result.
    ///
    /// The mirror is updated even when the disk write fails, so that a cleared
    /// session is never resurrected by a later read.
    fn update<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut StoredTokens),
    {
        let mut cached = self.cached.write();
        update(&mut cached);
        self.persist(&cached)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)?;
    // Pre-existing files keep their old mode on open.
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.cached.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.cached.read().refresh_token.clone()
    }

    fn store(&self, tokens: &AuthTokens) -> Result<()> {
        self.update(|cached| *cached = StoredTokens::from(tokens))
    }

    fn store_access(&self, access: &str) -> Result<()> {
        self.update(|cached| cached.access_token = Some(access.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.update(|cached| *cached = StoredTokens::default())
    }
}
