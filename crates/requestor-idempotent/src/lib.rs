//! Idempotency decorator for requestors.
//!
//! An [`IdempotentRequestor`] collapses repeated submissions of the same
//! request into one call to the inner requestor. Requests are identified by
//! a fingerprint of their url, method, headers, body and params.
//!
//! - A repeat arriving within the window after the first submission settled
//!   successfully is answered from a volatile store (60 seconds by default).
//! - A repeat arriving while the first submission is still in flight waits
//!   for it and receives the same outcome, success or failure.
//!
//! Failures are never stored, so a repeat after a failed submission is sent
//! again.
//!
//! # Examples
//!
//! ```
//! use requestor_idempotent::IdempotentLayer;
//! use requestor_core::{RequestConfig, RequestError, RequestOptions, RequestorExt, Response, ServiceRequestor};
//! use serde_json::json;
//! use tower::Layer;
//!
//! # async fn example() -> Result<(), RequestError> {
//! let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
//!     Ok::<_, RequestError>(Response::ok(json!({"created": true}), config))
//! }));
//!
//! let orders = IdempotentLayer::builder()
//!     .on_duplicate(|key| println!("suppressed duplicate {key}"))
//!     .build()
//!     .layer(transport);
//!
//! orders.post("/orders", Some(json!({"sku": 7})), RequestOptions::new()).await?;
//! // Answered without a second call.
//! orders.post("/orders", Some(json!({"sku": 7})), RequestOptions::new()).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod in_flight;
mod layer;

pub use config::{IdempotentConfig, IdempotentConfigBuilder, KeyGenerator, DEFAULT_DURATION};
pub use events::IdempotentEvent;
pub use layer::IdempotentLayer;

use in_flight::{InFlight, LeaderGuard};
use requestor_cache::{CacheRequestor, SharedStore};
use requestor_core::{EventBus, RequestConfig, Requestor, ResponseFuture};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

/// A [`Requestor`] that suppresses duplicate submissions.
pub struct IdempotentRequestor<R> {
    cache: CacheRequestor<R>,
    in_flight: Arc<InFlight>,
    config: Arc<IdempotentConfig>,
}

impl<R> IdempotentRequestor<R> {
    pub(crate) fn new(cache: CacheRequestor<R>, config: Arc<IdempotentConfig>) -> Self {
        #[cfg(feature = "metrics")]
        describe_counter!(
            "idempotent_requests_total",
            "Total number of requests by role (leader or waiter)"
        );

        Self {
            cache,
            in_flight: Arc::new(InFlight::new()),
            config,
        }
    }

    /// The store holding settled responses, for explicit invalidation.
    pub fn store(&self) -> &SharedStore {
        self.cache.store()
    }

    /// Distinct requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// The wrapped requestor.
    pub fn get_ref(&self) -> &R {
        self.cache.get_ref()
    }
}

impl<R: Requestor> Requestor for IdempotentRequestor<R> {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        Box::pin(async move {
            let settings = &self.config;
            if !settings.coalesce_in_flight {
                return self.cache.request(config).await;
            }

            let key = (settings.gen_key)(&config);
            match self.in_flight.try_join(&key) {
                Some(mut waiter) => {
                    #[cfg(feature = "metrics")]
                    counter!("idempotent_requests_total", "idempotent" => settings.name.clone(), "role" => "waiter")
                        .increment(1);

                    tracing::debug!(idempotent = %settings.name, key = %key, "joining in-flight request");
                    settings.event_listeners.emit(&IdempotentEvent::Coalesced {
                        pattern_name: settings.name.clone(),
                        timestamp: Instant::now(),
                        key: key.clone(),
                    });

                    match waiter.recv().await {
                        Ok(Ok(mut response)) => {
                            response.config = config;
                            Ok(response)
                        }
                        Ok(Err(error)) => Err(error),
                        Err(_) => {
                            // The leader went away without settling.
                            tracing::debug!(idempotent = %settings.name, key = %key, "in-flight request abandoned, sending again");
                            self.cache.request(config).await
                        }
                    }
                }
                None => {
                    #[cfg(feature = "metrics")]
                    counter!("idempotent_requests_total", "idempotent" => settings.name.clone(), "role" => "leader")
                        .increment(1);

                    let guard = LeaderGuard::new(Arc::clone(&self.in_flight), key);
                    let result = self.cache.request(config).await;
                    guard.complete(&result);
                    result
                }
            }
        })
    }

    fn events(&self) -> &EventBus {
        self.cache.events()
    }
}
