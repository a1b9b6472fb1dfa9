use super::{KeyValueStore, StoreError};
use crate::shared::fs_atomic::atomic_write_file;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value store persisted as a single JSON object on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

fn read_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Read {
        path: path.display().to_string(),
        source,
    }
}

fn write_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Write {
        path: path.display().to_string(),
        source,
    }
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| read_error(&self.path, e))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Where an unparseable document is moved before the store starts over.
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Loads entries for a write. A document that no longer parses is set
    /// aside at [`corrupt_path`](Self::corrupt_path) and writing starts empty.
    fn load_for_update(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match self.load() {
            Err(StoreError::Parse { .. }) => {
                fs::rename(&self.path, self.corrupt_path())
                    .map_err(|e| write_error(&self.path, e))?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Encode {
            path: self.path.display().to_string(),
            source,
        })?;
        atomic_write_file(&self.path, &body).map_err(|e| write_error(&self.path, e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load_for_update()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries)
    }
}
