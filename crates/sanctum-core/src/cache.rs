//! Scoped local key/value persistence.
//!
//! Every key is namespaced under [`CACHE_PREFIX`] so the cache can share a
//! backing document with other application state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Fixed namespace for every key written through a [`LocalCache`].
pub const CACHE_PREFIX: &str = "sanctum:";

fn scoped(key: &str) -> String {
    format!("{}{}", CACHE_PREFIX, key)
}

/// Local key/value persistence.
pub trait LocalCache {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Read a value, falling back to `default` when absent.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// Process-lifetime cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    values: BTreeMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(&scoped(key)).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(scoped(key), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(&scoped(key));
        Ok(())
    }
}

/// Cache persisted as a JSON object on disk.
///
/// The whole document is rewritten atomically on every change. An unreadable
/// document is treated as empty; the cache is advisory.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileCache {
    pub fn open(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable local cache");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&self.values)?;
        crate::fs::write_atomic(&self.path, &contents)?;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(&scoped(key)).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(scoped(key), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(&scoped(key)).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
