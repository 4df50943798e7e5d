//! Response caching decorator for requestors.
//!
//! A [`CacheRequestor`] answers a request from its store when a fresh,
//! valid entry exists, without calling the inner requestor. Otherwise it
//! delegates, stores the successful response, and returns it. Failures
//! propagate unchanged and are never cached.
//!
//! # Features
//!
//! - **Pluggable keys**: path-and-query key by default, any `Fn(&RequestConfig) -> String`
//! - **Two store kinds**: volatile memory (optionally LRU-bounded) or durable key-value storage
//! - **Validity predicate**: veto a fresh entry per request
//! - **Event System**: Hit, Miss and Stored events
//!
//! # Examples
//!
//! ```
//! use requestor_cache::CacheLayer;
//! use requestor_core::{RequestConfig, RequestError, RequestOptions, RequestorExt, Response, ServiceRequestor};
//! use std::time::Duration;
//! use tower::Layer;
//!
//! # async fn example() -> Result<(), RequestError> {
//! let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
//!     Ok::<_, RequestError>(Response::ok(serde_json::json!({"users": []}), config))
//! }));
//!
//! let cached = CacheLayer::builder()
//!     .duration(Duration::from_secs(300))
//!     .on_hit(|key| println!("cache hit: {key}"))
//!     .build()
//!     .layer(transport);
//!
//! let first = cached.get("/api/users", RequestOptions::new()).await?;
//! let second = cached.get("/api/users", RequestOptions::new()).await?;
//! assert_eq!(first.data, second.data);
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod layer;

pub use config::{
    CacheConfig, CacheConfigBuilder, KeyFn, SharedStore, ValidityFn, DEFAULT_DURATION,
};
pub use events::CacheEvent;
pub use layer::CacheLayer;

use requestor_core::{EventBus, RequestConfig, Requestor, Response, ResponseFuture};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

/// A [`Requestor`] that caches successful responses.
pub struct CacheRequestor<R> {
    inner: R,
    config: Arc<CacheConfig>,
    store: SharedStore,
}

impl<R> CacheRequestor<R> {
    /// Creates a new `CacheRequestor` wrapping `inner`, opening its own store.
    pub fn new(inner: R, config: Arc<CacheConfig>) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "cache_requests_total",
                "Total number of cache lookups (hits and misses)"
            );
            describe_counter!(
                "cache_stores_total",
                "Total number of responses written to the cache"
            );
        }

        let store = config.open_store();
        Self {
            inner,
            config,
            store,
        }
    }

    /// The store backing this cache, for explicit invalidation.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// The wrapped requestor.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the cached response for `key`, if one may answer `config`.
    async fn lookup(&self, key: &str, config: &RequestConfig) -> Option<Response> {
        if !self.store.has(key).await || !(self.config.is_valid)(key, config) {
            return None;
        }
        let plain = self.store.get(key).await?;
        Some(Response::from_plain(plain, config.clone()))
    }

    fn emit(&self, event: CacheEvent) {
        self.config.event_listeners.emit(&event);
    }
}

impl<R: Requestor> Requestor for CacheRequestor<R> {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        Box::pin(async move {
            let key = (self.config.key_fn)(&config);
            let name = &self.config.name;

            if let Some(response) = self.lookup(&key, &config).await {
                #[cfg(feature = "metrics")]
                counter!("cache_requests_total", "cache" => name.clone(), "result" => "hit")
                    .increment(1);

                tracing::debug!(cache = %name, key = %key, "cache hit");
                self.emit(CacheEvent::Hit {
                    pattern_name: name.clone(),
                    timestamp: Instant::now(),
                    key,
                });
                return Ok(response);
            }

            #[cfg(feature = "metrics")]
            counter!("cache_requests_total", "cache" => name.clone(), "result" => "miss")
                .increment(1);

            tracing::debug!(cache = %name, key = %key, "cache miss");
            self.emit(CacheEvent::Miss {
                pattern_name: name.clone(),
                timestamp: Instant::now(),
                key: key.clone(),
            });

            let response = self.inner.request(config).await?;

            self.store
                .set(&key, response.to_plain(), self.config.duration)
                .await;

            #[cfg(feature = "metrics")]
            counter!("cache_stores_total", "cache" => name.clone()).increment(1);

            self.emit(CacheEvent::Stored {
                pattern_name: name.clone(),
                timestamp: Instant::now(),
                key,
            });

            Ok(response)
        })
    }

    fn events(&self) -> &EventBus {
        self.inner.events()
    }
}
