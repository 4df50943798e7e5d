//! Durable store over a [`KeyValueStorage`] backend.

use crate::backend::KeyValueStorage;
use crate::CacheStore;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Prefix applied to every key written by a [`StorageStore`].
pub const DEFAULT_PREFIX: &str = "request_cache_";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry<V> {
    value: V,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expire_at: Option<u64>,
}

impl<V> StoredEntry<V> {
    fn is_expired(&self, now: u64) -> bool {
        self.expire_at.is_some_and(|expire_at| now > expire_at)
    }
}

enum Lookup<V> {
    Live(V),
    Absent,
}

/// [`CacheStore`] that survives process restarts.
///
/// Each entry is one JSON record `{"value": .., "expireAt": <unix millis>}`
/// stored under `prefix + key`. Records that fail to decode are logged,
/// removed and reported absent. Backend failures are logged and degrade
/// to absent / no-op; no operation ever returns an error.
///
/// All operations on one store are serialized.
pub struct StorageStore<S, V> {
    storage: S,
    prefix: String,
    lock: Mutex<()>,
    _value: PhantomData<fn() -> V>,
}

impl<S, V> StorageStore<S, V>
where
    S: KeyValueStorage,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a store using [`DEFAULT_PREFIX`].
    pub fn new(storage: S) -> Self {
        Self::with_prefix(storage, DEFAULT_PREFIX)
    }

    /// Creates a store namespaced by `prefix`.
    pub fn with_prefix(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
            lock: Mutex::new(()),
            _value: PhantomData,
        }
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Removes every expired or malformed entry under this prefix.
    /// Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let _guard = self.lock.lock().await;
        let now = now_millis();
        let mut removed = 0;
        for full_key in self.prefixed_keys().await {
            let stale = match self.storage.get_item(&full_key).await {
                Ok(Some(raw)) => serde_json::from_str::<StoredEntry<serde_json::Value>>(&raw)
                    .map(|entry| entry.is_expired(now))
                    .unwrap_or(true),
                Ok(None) => false,
                Err(err) => {
                    tracing::warn!(key = %full_key, error = %err, "storage read failed during purge");
                    false
                }
            };
            if stale && self.remove_full(&full_key).await {
                removed += 1;
            }
        }
        removed
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    async fn prefixed_keys(&self) -> Vec<String> {
        match self.storage.keys().await {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(&self.prefix))
                .collect(),
            Err(err) => {
                tracing::warn!(prefix = %self.prefix, error = %err, "storage key listing failed");
                Vec::new()
            }
        }
    }

    async fn remove_full(&self, full_key: &str) -> bool {
        match self.storage.remove_item(full_key).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "storage remove failed");
                false
            }
        }
    }

    /// Reads and validates one record. Caller holds the lock.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        let full_key = self.full_key(key);
        let raw = match self.storage.get_item(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Lookup::Absent,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "storage read failed");
                return Lookup::Absent;
            }
        };

        match serde_json::from_str::<StoredEntry<T>>(&raw) {
            Ok(entry) if entry.is_expired(now_millis()) => {
                self.remove_full(&full_key).await;
                Lookup::Absent
            }
            Ok(entry) => Lookup::Live(entry.value),
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "discarding malformed cache entry");
                self.remove_full(&full_key).await;
                Lookup::Absent
            }
        }
    }
}

impl<S, V> CacheStore<V> for StorageStore<S, V>
where
    S: KeyValueStorage,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn has<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            matches!(
                self.lookup::<serde_json::Value>(key).await,
                Lookup::Live(_)
            )
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<V>> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            match self.lookup::<V>(key).await {
                Lookup::Live(value) => Some(value),
                Lookup::Absent => None,
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: V, ttl: Option<Duration>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let full_key = self.full_key(key);
            let entry = StoredEntry {
                value,
                expire_at: ttl.map(|ttl| now_millis().saturating_add(duration_millis(ttl))),
            };
            let raw = match serde_json::to_string(&entry) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(key = %full_key, error = %err, "cache entry not serializable");
                    return;
                }
            };

            let _guard = self.lock.lock().await;
            if let Err(err) = self.storage.set_item(&full_key, raw).await {
                tracing::warn!(key = %full_key, error = %err, "storage write failed");
            }
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            self.remove_full(&self.full_key(key)).await;
        })
    }

    fn clear(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            for full_key in self.prefixed_keys().await {
                self.remove_full(&full_key).await;
            }
        })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_millis)
        .unwrap_or(0)
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
