//! Persistent key-value storage
//!
//! Mirrors the browser-local storage model: string keys, string values,
//! synchronous access. `FileStore` keeps one file per key under a directory,
//! `MemoryStore` is process-local.

use crate::error::CoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// String-keyed, string-valued storage
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. `Ok(None)` when the slot does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Replace a slot in one step. Readers see either the old or the new value.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Remove a slot. Returns whether anything was removed.
    fn remove(&self, key: &str) -> Result<bool, CoreError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), CoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Directory-backed store: slot `key` lives in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| CoreError::StorageWrite {
            path: dir.clone(),
            source,
        })?;
        debug!(path = %dir.display(), "File store opened");
        Ok(Self { dir })
    }

    /// Default location: `<data dir>/recipebox`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("recipebox"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a slot
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, CoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CoreError::StorageRead { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.slot_path(key)?;

        // Each write gets its own temp file so concurrent writers never share one
        let mut tmp =
            NamedTempFile::new_in(&self.dir).map_err(|source| CoreError::StorageWrite {
                path: self.dir.clone(),
                source,
            })?;

        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| CoreError::StorageWrite {
                path: tmp.path().to_path_buf(),
                source,
            })?;

        // persist renames, which is atomic on the same filesystem
        tmp.persist(&path).map_err(|e| CoreError::StorageWrite {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(key, bytes = value.len(), "Slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CoreError> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CoreError::StorageRemove { path, source }),
        }
    }
}

/// In-memory store (tests, ephemeral runs)
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        validate_key(key)?;
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        validate_key(key)?;
        self.slots.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CoreError> {
        validate_key(key)?;
        Ok(self.slots.write().remove(key).is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, CoreError> {
        (**self).remove(key)
    }
}
