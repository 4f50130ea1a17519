//! Session Storage
//!
//! A small string key-value store scoped to one browsing session. The cart is
//! the only writer; see [`crate::cart::CartStore`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

/// Errors raised by a session storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be read or written.
    #[error("session storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The store's own contents could not be decoded.
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The store refused the write.
    #[error("session storage quota exceeded ({size} bytes)")]
    QuotaExceeded {
        /// Size of the rejected value in bytes
        size: usize,
    },
}

/// Session-scoped string key-value store.
pub trait SessionStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store rejects the write.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory session storage with an optional size quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects values larger than `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            quota: Some(quota),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.quota.is_some_and(|quota| value.len() > quota) {
            return Err(StorageError::QuotaExceeded { size: value.len() });
        }

        self.entries.insert(key.to_string(), value.to_string());

        Ok(())
    }
}

/// Session storage kept in a JSON object on disk.
///
/// The whole file is rewritten on every change. A missing file reads as empty,
/// and a corrupt file is replaced by the next write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<FxHashMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(FxHashMap::default());
            }
            Err(error) => return Err(error.into()),
        };

        if contents.trim().is_empty() {
            return Ok(FxHashMap::default());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    /// Current entries as the base for a write; a corrupt file starts over empty.
    fn entries_for_write(&self) -> Result<FxHashMap<String, String>, StorageError> {
        match self.read_entries() {
            Err(StorageError::Corrupt(error)) => {
                warn!(path = %self.path.display(), %error, "overwriting corrupt session file");
                Ok(FxHashMap::default())
            }
            result => result,
        }
    }

    fn write_entries(&self, entries: &FxHashMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entries)?;

        fs::write(&self.path, contents)?;

        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries_for_write()?;

        entries.insert(key.to_string(), value.to_string());

        self.write_entries(&entries)
    }
}
