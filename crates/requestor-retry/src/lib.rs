//! Retry decorator for requestors.
//!
//! A [`RetryRequestor`] re-issues a failed request until it succeeds, the
//! retry predicate declines, or `max_count` retries have been made. The
//! caller sees either the first success or the last error, unchanged.
//!
//! # Features
//!
//! - **Linear backoff by default**: the n-th retry waits `delay * n`
//! - **IntervalFunction abstraction**: fixed, linear, exponential, jittered or custom waits
//! - **Retry predicate**: `Fn(&RequestError, retries_so_far) -> bool`
//! - **Event system**: Retry, Success, Exhausted and IgnoredError events
//!
//! Each failed attempt is logged as it happens, even though the error only
//! reaches the caller once retries stop.
//!
//! # Examples
//!
//! ```
//! use requestor_retry::RetryConfig;
//! use requestor_core::{RequestConfig, RequestError, Response, ServiceRequestor};
//! use std::time::Duration;
//! use tower::Layer;
//!
//! let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
//!     Ok::<_, RequestError>(Response::ok(serde_json::Value::Null, config))
//! }));
//!
//! let retrying = RetryConfig::builder()
//!     .max_count(3)
//!     .delay(Duration::from_millis(500))
//!     .should_retry(|error, _retries| error.status_code().map_or(true, |s| s >= 500))
//!     .on_retry(|attempt, delay| println!("retry {attempt} in {delay:?}"))
//!     .build()
//!     .layer()
//!     .layer(transport);
//! ```

mod backoff;
mod config;
mod events;
mod layer;

pub use backoff::{
    ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, FnInterval, IntervalFunction,
    LinearBackoff,
};
pub use config::{
    is_transient, RetryConfig, RetryConfigBuilder, RetryPredicate, DEFAULT_DELAY,
    DEFAULT_MAX_COUNT,
};
pub use events::RetryEvent;
pub use layer::RetryLayer;

use requestor_core::{EventBus, RequestConfig, Requestor, ResponseFuture};
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

/// A [`Requestor`] that retries failed requests.
pub struct RetryRequestor<R> {
    inner: R,
    config: Arc<RetryConfig>,
}

impl<R> RetryRequestor<R> {
    /// Creates a new `RetryRequestor` wrapping `inner`.
    pub fn new(inner: R, config: Arc<RetryConfig>) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "retry_calls_total",
                "Total number of retried calls by final outcome"
            );
            describe_counter!(
                "retry_attempts_total",
                "Total number of retry attempts made"
            );
        }

        Self { inner, config }
    }

    /// The wrapped requestor.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Requestor> Requestor for RetryRequestor<R> {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        Box::pin(async move {
            let settings = &self.config;
            let mut retries = 0;

            loop {
                let error = match self.inner.request(config.clone()).await {
                    Ok(response) => {
                        #[cfg(feature = "metrics")]
                        counter!("retry_calls_total", "retry" => settings.name.clone(), "result" => "success")
                            .increment(1);

                        settings.event_listeners.emit(&RetryEvent::Success {
                            pattern_name: settings.name.clone(),
                            timestamp: Instant::now(),
                            attempts: retries + 1,
                        });
                        return Ok(response);
                    }
                    Err(error) => error,
                };

                tracing::warn!(
                    retry = %settings.name,
                    url = %config.url,
                    attempt = retries + 1,
                    error = %error,
                    "request attempt failed"
                );

                if retries >= settings.max_count {
                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => settings.name.clone(), "result" => "exhausted")
                        .increment(1);

                    settings.event_listeners.emit(&RetryEvent::Exhausted {
                        pattern_name: settings.name.clone(),
                        timestamp: Instant::now(),
                        attempts: retries + 1,
                    });
                    return Err(error);
                }

                if !(settings.should_retry)(&error, retries) {
                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => settings.name.clone(), "result" => "ignored")
                        .increment(1);

                    settings.event_listeners.emit(&RetryEvent::IgnoredError {
                        pattern_name: settings.name.clone(),
                        timestamp: Instant::now(),
                        attempts: retries + 1,
                    });
                    return Err(error);
                }

                let delay = settings.interval_fn.next_interval(retries);
                retries += 1;

                #[cfg(feature = "metrics")]
                counter!("retry_attempts_total", "retry" => settings.name.clone()).increment(1);

                tracing::debug!(
                    retry = %settings.name,
                    "retrying request ({}/{}) in {:?}",
                    retries,
                    settings.max_count,
                    delay
                );
                settings.event_listeners.emit(&RetryEvent::Retry {
                    pattern_name: settings.name.clone(),
                    timestamp: Instant::now(),
                    attempt: retries,
                    delay,
                });

                tokio::time::sleep(delay).await;
            }
        })
    }

    fn events(&self) -> &EventBus {
        self.inner.events()
    }
}
