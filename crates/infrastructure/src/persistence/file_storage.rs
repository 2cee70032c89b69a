//! File-backed key-value storage.
//!
//! Stores the session record as a JSON map in the platform config
//! directory:
//! - Linux/macOS: `~/.config/warden/session.json`
//! - Windows: `%APPDATA%/warden/session.json`
//!
//! The `KeyValueStorage` port is synchronous, so this adapter uses
//! blocking `std::fs` writes: every mutation is flushed before control
//! returns, which is what the session store's atomicity relies on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use warden_application::ports::KeyValueStorage;

/// Error type for storage setup.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Could not determine the platform config directory.
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// `KeyValueStorage` backed by a JSON file, with an in-memory
/// write-through map.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens storage at the default platform path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoConfigDir`] when the platform has no
    /// config directory, or an IO error if it cannot be created.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::config_dir()
            .ok_or(StorageError::NoConfigDir)?
            .join("warden");
        std::fs::create_dir_all(&dir)?;
        Self::open(dir.join("session.json"))
    }

    /// Opens storage at an explicit path.
    ///
    /// A missing file starts empty; a corrupted file is discarded with a
    /// warning rather than failing open, matching the session store's
    /// fail-closed posture.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file exists but cannot be read.
    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(%error, path = %path.display(), "storage file is corrupted, starting empty");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let Ok(content) = serde_json::to_string_pretty(entries) else {
            tracing::error!("storage map could not be serialized");
            return;
        };
        if let Err(error) = std::fs::write(&self.path, content) {
            tracing::error!(%error, path = %self.path.display(), "failed to persist storage file");
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}
