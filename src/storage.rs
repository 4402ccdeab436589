//! Durable key-value storage.
//!
//! Synchronous, string-valued, like the browser's LocalStorage. Batch writes
//! are all-or-nothing from a reader's perspective.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StorageError;

pub trait KeyValueStorage {
    /// Returns `None` if the key is missing or the backend is unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes every entry or none of them.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Removes every listed key. Missing keys are not an error.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }
}

// =========================================================
// In-memory
// =========================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries.borrow_mut();
        for (k, v) in entries {
            map.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.entries.borrow_mut();
        for k in keys {
            map.remove(*k);
        }
        Ok(())
    }
}

// =========================================================
// File-backed
// =========================================================

/// A JSON object on disk, rewritten through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// A missing or corrupt file reads as an empty store.
    fn read_all(&self) -> BTreeMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "storage file is corrupt, treating as empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "storage file is unreadable, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let raw = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp, raw).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.io_error(e)
        })
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.read_all();
        for (k, v) in entries {
            map.insert(k.to_string(), v.to_string());
        }
        self.write_all(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        // Always rewrite so a corrupt file is replaced by a well-formed one.
        let mut map = self.read_all();
        for k in keys {
            map.remove(*k);
        }
        self.write_all(&map)
    }
}

// =========================================================
// Test helpers
// =========================================================

/// Wraps a [`MemoryStorage`] and counts batch writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CountingStorage {
    pub inner: MemoryStorage,
    pub writes: std::cell::Cell<usize>,
    pub removals: std::cell::Cell<usize>,
}

#[cfg(test)]
impl KeyValueStorage for CountingStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        self.writes.set(self.writes.get() + 1);
        self.inner.set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.removals.set(self.removals.get() + 1);
        self.inner.remove_many(keys)
    }
}
