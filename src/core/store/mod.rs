//! Engine configuration persistence.
//!
//! A [`ConfigStore`] is a file-backed namespaced string key-value store: a
//! single JSON document on disk, a `RwLock`-guarded map in memory. On top of
//! it sit the per-engine [`EngineConfigRepository`] implementations, which
//! own the key layout for their engine.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

mod repo;

pub use repo::{
    EngineConfig, EngineConfigRepository, Qwen3ConfigRepository, SeedTts2ConfigRepository,
};

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

struct StoreInner {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

/// File-backed key-value store for engine configuration.
///
/// Cheap to clone; all clones share the same in-memory map and disk file.
/// Writes persist the whole document atomically (temp file + rename).
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<StoreInner>,
}

impl ConfigStore {
    /// Open a store at the given path, loading existing entries.
    ///
    /// A missing file yields an empty store. A corrupt file is logged and
    /// treated as empty rather than failing startup; it is overwritten on
    /// the next write.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
                Ok(map) => {
                    debug!("config store: loaded {} entries from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!("config store: ignoring corrupt file {}: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                entries: RwLock::new(entries),
            }),
        })
    }

    /// Retrieve a value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.read().get(key).cloned()
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.entries.read().contains_key(key)
    }

    /// Insert several entries and persist the store to disk.
    pub fn set_many(
        &self,
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> StoreResult<()> {
        {
            let mut entries = self.inner.entries.write();
            for (key, value) in pairs {
                entries.insert(key, value);
            }
        }
        self.persist()
    }

    fn persist(&self) -> StoreResult<()> {
        let snapshot = self.inner.entries.read().clone();
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.inner.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?)?;
        fs::rename(&tmp, &self.inner.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("store.json")
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(store_path(&dir)).unwrap();
        assert!(store.get("anything").is_none());
        assert!(!store.contains("anything"));
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(store_path(&dir)).unwrap();
        store
            .set_many([("engine_x_api_key".to_string(), "secret".to_string())])
            .unwrap();
        assert_eq!(store.get("engine_x_api_key").as_deref(), Some("secret"));
        assert!(store.contains("engine_x_api_key"));
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        {
            let store = ConfigStore::open(&path).unwrap();
            store
                .set_many([("k".to_string(), "v".to_string())])
                .unwrap();
        }
        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        fs::write(&path, b"not json at all").unwrap();
        let store = ConfigStore::open(&path).unwrap();
        assert!(store.get("k").is_none());
        // And the next write replaces the corrupt document
        store
            .set_many([("k".to_string(), "v".to_string())])
            .unwrap();
        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn clones_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(store_path(&dir)).unwrap();
        let clone = store.clone();
        clone
            .set_many([("shared".to_string(), "yes".to_string())])
            .unwrap();
        assert_eq!(store.get("shared").as_deref(), Some("yes"));
    }
}
