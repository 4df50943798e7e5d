//! Configuration for the cache decorator.

use crate::events::CacheEvent;
use requestor_core::key::path_key;
use requestor_core::{EventListeners, FnListener, PlainResponse, RequestConfig};
use requestor_store::{
    CacheStore, KeyValueStorage, MemoryStore, StorageStore, DEFAULT_PREFIX,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of a cached response.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5 * 60);

/// Derives the cache key of a request.
pub type KeyFn = Arc<dyn Fn(&RequestConfig) -> String + Send + Sync>;

/// Decides whether a fresh entry may answer a request.
pub type ValidityFn = Arc<dyn Fn(&str, &RequestConfig) -> bool + Send + Sync>;

/// A store holding cached responses.
pub type SharedStore = Arc<dyn CacheStore<PlainResponse>>;

/// Where a cache keeps its entries.
#[derive(Clone)]
pub(crate) enum StoreKind {
    Memory { capacity: Option<NonZeroUsize> },
    Persistent { storage: Arc<dyn KeyValueStorage> },
    Shared(SharedStore),
}

/// Configuration for the cache decorator.
pub struct CacheConfig {
    pub(crate) key_fn: KeyFn,
    pub(crate) duration: Option<Duration>,
    pub(crate) is_valid: ValidityFn,
    pub(crate) store: StoreKind,
    pub(crate) prefix: String,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
    pub(crate) name: String,
}

impl CacheConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// Opens the store a new decorator instance will own.
    ///
    /// Memory stores are fresh per call. Persistent stores open a view over
    /// the configured storage, so entries written earlier are visible.
    pub(crate) fn open_store(&self) -> SharedStore {
        match &self.store {
            StoreKind::Memory { capacity: None } => Arc::new(MemoryStore::new()),
            StoreKind::Memory {
                capacity: Some(capacity),
            } => Arc::new(MemoryStore::with_capacity(*capacity)),
            StoreKind::Persistent { storage } => Arc::new(StorageStore::with_prefix(
                Arc::clone(storage),
                self.prefix.clone(),
            )),
            StoreKind::Shared(store) => Arc::clone(store),
        }
    }
}

/// Builder for configuring and constructing a cache decorator.
pub struct CacheConfigBuilder {
    key_fn: KeyFn,
    duration: Option<Duration>,
    is_valid: ValidityFn,
    store: StoreKind,
    prefix: String,
    event_listeners: EventListeners<CacheEvent>,
    name: String,
}

impl CacheConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            key_fn: Arc::new(path_key),
            duration: Some(DEFAULT_DURATION),
            is_valid: Arc::new(|_, _| true),
            store: StoreKind::Memory { capacity: None },
            prefix: DEFAULT_PREFIX.to_string(),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the function that derives a cache key from a request.
    ///
    /// Default: [`path_key`] (`METHOD:path?query`).
    pub fn key_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestConfig) -> String + Send + Sync + 'static,
    {
        self.key_fn = Arc::new(f);
        self
    }

    /// Sets how long a stored response stays fresh.
    ///
    /// Default: 5 minutes
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Stores responses without a time limit.
    pub fn without_expiry(mut self) -> Self {
        self.duration = None;
        self
    }

    /// Sets the predicate consulted before a fresh entry is served.
    ///
    /// Receives the key and the incoming request. When it returns false
    /// the request is treated as a miss. Default: always true.
    pub fn is_valid<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &RequestConfig) -> bool + Send + Sync + 'static,
    {
        self.is_valid = Arc::new(f);
        self
    }

    /// Keeps entries in process memory. This is the default.
    pub fn memory(mut self) -> Self {
        self.store = StoreKind::Memory { capacity: None };
        self
    }

    /// Keeps at most `capacity` entries in memory, evicting the least
    /// recently used.
    pub fn memory_with_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.store = StoreKind::Memory {
            capacity: Some(capacity),
        };
        self
    }

    /// Keeps entries in durable storage so they survive restarts.
    pub fn persistent<S>(mut self, storage: S) -> Self
    where
        S: KeyValueStorage + 'static,
    {
        self.store = StoreKind::Persistent {
            storage: Arc::new(storage),
        };
        self
    }

    /// Sets the key prefix used by persistent storage.
    ///
    /// Default: `"request_cache_"`
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Uses an existing store.
    ///
    /// Every decorator built from this config writes into the same store.
    /// Keep key namespaces disjoint when sharing across decorators.
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = StoreKind::Shared(store);
        self
    }

    /// Sets the name of this cache instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with the key on every cache hit.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Hit { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key on every cache miss.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Miss { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key whenever a response is stored.
    pub fn on_stored<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Stored { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Builds the cache layer.
    pub fn build(self) -> crate::CacheLayer {
        crate::CacheLayer::new(self.into_config())
    }

    pub(crate) fn into_config(self) -> CacheConfig {
        CacheConfig {
            key_fn: self.key_fn,
            duration: self.duration,
            is_valid: self.is_valid,
            store: self.store,
            prefix: self.prefix,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
