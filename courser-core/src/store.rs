use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot persistence seam for one JSON document: callers read the whole
/// snapshot, mutate it, and write it back.
pub trait Repository<T>: Send + Sync {
    fn read(&self) -> Result<T, StoreError>;
    fn write(&self, snapshot: &T) -> Result<(), StoreError>;
}

impl<T, R: Repository<T>> Repository<T> for Arc<R> {
    fn read(&self) -> Result<T, StoreError> {
        (**self).read()
    }

    fn write(&self, snapshot: &T) -> Result<(), StoreError> {
        (**self).write(snapshot)
    }
}

/// A pretty-printed JSON document at a filesystem path. A missing file or a
/// corrupt document reads as the default snapshot.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<T> Repository<T> for JsonFileStore
where
    T: Serialize + DeserializeOwned + Default,
{
    fn read(&self) -> Result<T, StoreError> {
        if !self.path.exists() {
            return Ok(T::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!("Discarding corrupt document {}: {}", self.path.display(), e);
                Ok(T::default())
            }
        }
    }

    fn write(&self, snapshot: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(())
    }
}

/// In-memory snapshot double for tests and ephemeral callers.
pub struct MemoryStore<T> {
    inner: Mutex<T>,
}

impl<T: Default> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(T::default()),
        }
    }
}

impl<T> MemoryStore<T> {
    pub fn with(snapshot: T) -> Self {
        Self {
            inner: Mutex::new(snapshot),
        }
    }
}

impl<T: Default> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> Repository<T> for MemoryStore<T> {
    fn read(&self) -> Result<T, StoreError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn write(&self, snapshot: &T) -> Result<(), StoreError> {
        *self.inner.lock().unwrap() = snapshot.clone();
        Ok(())
    }
}
