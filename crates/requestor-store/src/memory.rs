//! Volatile in-process store.

use crate::CacheStore;
use futures::future::BoxFuture;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expire_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expire_at.is_some_and(|expire_at| now > expire_at)
    }
}

/// In-memory [`CacheStore`], lost when the process exits.
///
/// Unbounded by default. [`with_capacity`](MemoryStore::with_capacity)
/// evicts the least recently used entry once full. Expiry is lazy: an
/// expired entry is removed by the `has`/`get` that finds it, or by
/// [`purge_expired`](MemoryStore::purge_expired).
///
/// Time is read from `tokio::time`, so a paused test clock controls expiry.
pub struct MemoryStore<V> {
    entries: Mutex<LruCache<String, Entry<V>>>,
}

impl<V> MemoryStore<V> {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Creates a store holding at most `capacity` entries.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_live<T>(&self, key: &str, f: impl FnOnce(&V) -> T) -> Option<T> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(f(&entry.value)),
            Some(_) => {}
        }
        entries.pop(key);
        None
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn has<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move { self.with_live(key, |_| ()).is_some() })
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<V>> {
        Box::pin(async move { self.with_live(key, V::clone) })
    }

    fn set<'a>(&'a self, key: &'a str, value: V, ttl: Option<Duration>) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let entry = Entry {
                value,
                expire_at: ttl.map(|ttl| Instant::now() + ttl),
            };
            self.lock().put(key.to_string(), entry);
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.lock().pop(key);
        })
    }

    fn clear(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.lock().clear();
        })
    }
}
