//! Injected key/value storage.
//!
//! The rate limiter and the CSRF helpers never touch an ambient environment
//! directly; they read and write through the [`KeyValueStore`] trait so the
//! backing store is the caller's choice and tests stay deterministic.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: HashMap-backed, for tests and ephemeral sessions.
//! - [`JsonFileStore`]: persists the map as pretty-printed JSON on every
//!   mutation, loading leniently so a missing file is just an empty store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};

// =============================================================================
// TRAIT
// =============================================================================

/// Minimal synchronous key/value interface.
///
/// Methods are total: a failed backend write is logged by the implementation
/// rather than surfaced, keeping every call site non-fallible. Backends that
/// can fail expose their own fallible entry points (see
/// [`JsonFileStore::open`] and [`JsonFileStore::flush`]).
pub trait KeyValueStore {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Remove the value stored under `key`, if any.
    fn remove(&mut self, key: &str);
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// HashMap-backed store with no persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// File-backed store persisting the whole map as JSON.
///
/// Every mutation rewrites the file; the expected scale is a handful of
/// rate-limit records and tokens, not a database. Write failures inside the
/// trait methods are logged and the in-memory view stays authoritative until
/// the next successful [`flush`](Self::flush).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store. A file that exists but does not
    /// parse as a string map is an error; silently discarding it would lose
    /// rate-limit history.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| Error::StorageCorrupt {
                path: path.display().to_string(),
                details: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(Error::StorageRead {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        Ok(Self { path, entries })
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the current map to disk, creating parent directories as needed.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::StorageWrite {
                    path: self.path.display().to_string(),
                    source: e,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json).map_err(|e| Error::StorageWrite {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to persist store");
        }
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            if let Err(e) = self.flush() {
                warn!(error = %e, "failed to persist store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k"), None);

        store.set("k", "v");
        assert_eq!(store.get("k"), Some("v".to_string()));
        assert_eq!(store.len(), 1);

        store.set("k", "v2");
        assert_eq!(store.get("k"), Some("v2".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_memory_store_clear() {
        let mut store = MemoryStore::new();
        store.set("a", "1");
        store.set("b", "2");
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("token", "abc123");
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("token"), Some("abc123".to_string()));
    }

    #[test]
    fn test_file_store_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("k", "v");
        store.remove("k");
        drop(store);

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("k", "v");
        assert!(path.exists());
    }
}
