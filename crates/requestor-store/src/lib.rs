//! Keyed value stores with optional per-entry time-to-live.
//!
//! Two backends implement [`CacheStore`]:
//!
//! - [`MemoryStore`]: volatile, in-process, optionally LRU-bounded.
//! - [`StorageStore`]: durable, JSON records in a [`KeyValueStorage`]
//!   ([`MemoryStorage`] or [`FileStorage`]) under a key prefix.
//!
//! Expiry is lazy: an entry whose deadline has passed is reported absent
//! and removed by the lookup that finds it. Store operations never fail;
//! backend problems are logged through `tracing` and treated as a miss.
//!
//! # Example
//!
//! ```
//! use requestor_store::{CacheStore, MemoryStore};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let store = MemoryStore::new();
//! store.set("GET:/api/users", 42u32, Some(Duration::from_secs(60))).await;
//! assert_eq!(store.get("GET:/api/users").await, Some(42));
//! # }
//! ```

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

pub mod backend;
pub mod error;
pub mod memory;
pub mod storage;

pub use backend::{FileStorage, KeyValueStorage, MemoryStorage};
pub use error::StorageError;
pub use memory::MemoryStore;
pub use storage::{StorageStore, DEFAULT_PREFIX};

/// A keyed value store with optional expiry.
///
/// An entry is *live* while it exists and its deadline (if any) has not
/// passed. `has` and `get` only ever see live entries.
pub trait CacheStore<V>: Send + Sync {
    /// True iff a live entry exists.
    fn has<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool>;

    /// The live value, if any.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<V>>;

    /// Inserts or replaces an entry. `None` never expires.
    fn set<'a>(&'a self, key: &'a str, value: V, ttl: Option<Duration>) -> BoxFuture<'a, ()>;

    /// Removes an entry.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ()>;

    /// Removes every entry this store owns.
    fn clear(&self) -> BoxFuture<'_, ()>;
}

impl<V, T: CacheStore<V> + ?Sized> CacheStore<V> for Arc<T> {
    fn has<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool> {
        (**self).has(key)
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<V>> {
        (**self).get(key)
    }

    fn set<'a>(&'a self, key: &'a str, value: V, ttl: Option<Duration>) -> BoxFuture<'a, ()> {
        (**self).set(key, value, ttl)
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ()> {
        (**self).delete(key)
    }

    fn clear(&self) -> BoxFuture<'_, ()> {
        (**self).clear()
    }
}
