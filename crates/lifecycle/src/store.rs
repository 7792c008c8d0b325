//! Persisted key-value storage for lifecycle markers
//!
//! The coordinator only needs four operations from its store. Hosts plug in
//! whatever persistence they have; two stores ship here:
//! - [`MemoryStore`] for tests and hosts without persistence
//! - [`JsonFileStore`] backed by a JSON object on disk

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use parking_lot::RwLock;

use crate::error::Result;

/// Key-value store that survives process restarts
pub trait MarkerStore: Send + Sync {
    /// Check whether a key is present
    fn contains(&self, key: &str) -> Result<bool>;

    /// Remove a key, returning the value it held
    fn remove(&self, key: &str) -> Result<Option<String>>;

    /// Add or overwrite a key
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read a key
    fn try_get(&self, key: &str) -> Result<Option<String>>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl MarkerStore for MemoryStore {
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.values.read().contains_key(key))
    }

    fn remove(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.write().remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn try_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }
}

/// Store persisted as a JSON object, rewritten on every mutation
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open a store; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "Opened marker store");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    // Write to a sibling file and rename so the replace is atomic on disk.
    // Callers swap the in-memory map only after this succeeds.
    fn persist(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl MarkerStore for JsonFileStore {
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.values.read().contains_key(key))
    }

    fn remove(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.values.write();
        if !values.contains_key(key) {
            return Ok(None);
        }

        let mut next = values.clone();
        let removed = next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(removed)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn try_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }
}
