/*!
 * Persistent Store
 * Key-value store the host round-trips between ticks
 *
 * Values are untyped JSON: the kernel validates their shape on load so a
 * corrupted or hand-edited store heals instead of failing the tick.
 */

use crate::core::errors::StoreError;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Durable key-value store available at tick start and end
pub trait Store {
    /// Read a value; `None` if the key was never written
    fn get(&self, key: &str) -> Option<Value>;

    /// Replace a value
    fn set(&mut self, key: &str, value: Value);

    /// Delete a key
    fn remove(&mut self, key: &str);

    /// Delete every key
    fn clear(&mut self);
}

/// In-memory store
///
/// Clones share the same data, so a host (or a test) can keep a handle and
/// inspect exactly what the kernel wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON document; non-object documents give an empty store
    pub fn from_document(document: Value) -> Self {
        let data = match document {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Copy of the whole store as one JSON object
    pub fn document(&self) -> Value {
        Value::Object(self.data.read().clone())
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.write().insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.data.write().remove(key);
    }

    fn clear(&mut self) {
        self.data.write().clear();
    }
}

/// Store backed by a JSON document on disk
///
/// Reads happen once in [`FileStore::open`]; writes stay in memory until
/// [`FileStore::flush`] replaces the file through a temporary sibling.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Map<String, Value>,
}

impl FileStore {
    /// Open a state file; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No state file yet, starting empty");
                Map::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        debug!(path = %path.display(), keys = data.len(), "Opened state file");
        Ok(Self { path, data })
    }

    /// Write the document back to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let text = serde_json::to_string_pretty(&self.data).map_err(|source| StoreError::Json {
            path: self.path.display().to_string(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), keys = self.data.len(), "Flushed state file");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the whole store as one JSON object
    pub fn document(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.data.remove(key);
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}
