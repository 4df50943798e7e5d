//! Durable key-value backends for [`StorageStore`](crate::StorageStore).

use crate::error::StorageError;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// A string key-value medium that outlives the process.
///
/// The contract mirrors host storage: string keys, string values, and an
/// enumeration of present keys. Backends may fail; callers decide how to
/// degrade.
pub trait KeyValueStorage: Send + Sync {
    /// Reads a value. `Ok(None)` when the key is absent.
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>>;

    /// Writes a value, replacing any existing one.
    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Removes a value. Removing an absent key succeeds.
    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Lists every key currently present.
    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        (**self).get_item(key)
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        (**self).set_item(key, value)
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
        (**self).keys()
    }
}

/// In-process [`KeyValueStorage`]. Clones share the same map.
///
/// Useful in tests to simulate a restart: build a second store over a
/// clone of the same storage.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held, across all prefixes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(async move { Ok(self.lock().get(key).cloned()) })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.lock().insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.lock().remove(key);
            Ok(())
        })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
        Box::pin(async move { Ok(self.lock().keys().cloned().collect()) })
    }
}

const FILE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// File-backed [`KeyValueStorage`]: one file per key inside a directory.
///
/// File names are the hex encoding of the key, so any key is a valid
/// name. Writes go to a temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (creating if needed) a storage directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{FILE_EXTENSION}", hex::encode(key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(async move {
            match tokio::fs::read_to_string(self.path_for(key)).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let path = self.path_for(key);
            let temp = path.with_extension(TEMP_EXTENSION);
            tokio::fs::write(&temp, value).await?;
            tokio::fs::rename(&temp, &path).await?;
            Ok(())
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            match tokio::fs::remove_file(self.path_for(key)).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StorageError>> {
        Box::pin(async move {
            let mut keys = Vec::new();
            let mut entries = tokio::fs::read_dir(&self.dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                    continue;
                }
                let decoded = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| hex::decode(stem).ok())
                    .and_then(|bytes| String::from_utf8(bytes).ok());
                match decoded {
                    Some(key) => keys.push(key),
                    None => tracing::debug!(path = %path.display(), "skipping foreign file"),
                }
            }
            Ok(keys)
        })
    }
}
