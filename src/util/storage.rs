//! Durable key/value storage for session persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store mirrors its identity and token here so a later process
//! can resume the session. Reads and writes are synchronous and small; a
//! whole-file JSON object is rewritten on every change.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Key holding the JSON-serialized identity of the logged-in user.
pub const USER_KEY: &str = "user";
/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Errors produced by storage writes.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synchronous string key/value store that outlives the process.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    fn contains_key(&self, key: &str) -> bool {
        self.get_item(key).is_some()
    }
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the underlying write fails.
pub fn save_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw)
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with `items`, as if a previous run had written them.
    #[must_use]
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = items.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { items: Mutex::new(items) }
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Storage backed by a single JSON object file.
///
/// A missing file reads as empty. An unreadable or corrupt file also reads as
/// empty (logged), and the next write replaces it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "storage read failed");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "storage file corrupt; treating as empty");
            BTreeMap::new()
        })
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_items();
        apply(&mut items);
        self.write_items(&items)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_items().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|items| {
            items.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|items| {
            items.remove(key);
        })
    }
}
