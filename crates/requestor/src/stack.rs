//! The recommended decorator stack, built from configuration.

use requestor_cache::CacheLayer;
use requestor_core::key::PathKey;
use requestor_core::Requestor;
use requestor_parallel::ParallelLayer;
use requestor_retry::RetryConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

/// Error returned when a [`StackConfig`] cannot be parsed.
pub type StackConfigError = serde_json::Error;

/// Settings for [`RequestorStack`].
///
/// Deserializes from camelCase JSON; every field is optional.
///
/// ```
/// use requestor::StackConfig;
///
/// let config = StackConfig::from_json(r#"{"enableRetry": false, "maxParallel": 2}"#).unwrap();
/// assert!(!config.enable_retry);
/// assert_eq!(config.max_parallel, 2);
/// assert_eq!(config.retry_count, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackConfig {
    /// Origin relative URLs are resolved against when deriving cache keys.
    pub base_url: String,
    /// Whether responses are cached.
    pub enable_cache: bool,
    /// How long cached responses stay fresh, in milliseconds.
    pub cache_duration_ms: u64,
    /// Whether failed requests are retried.
    pub enable_retry: bool,
    /// Retries after the first attempt.
    pub retry_count: usize,
    /// Base delay of the linear backoff, in milliseconds.
    pub retry_delay_ms: u64,
    /// Whether requests in flight are capped.
    pub enable_parallel: bool,
    /// Cap on requests in flight.
    pub max_parallel: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            enable_cache: true,
            cache_duration_ms: 300_000,
            enable_retry: true,
            retry_count: 3,
            retry_delay_ms: 1000,
            enable_parallel: true,
            max_parallel: 6,
        }
    }
}

impl StackConfig {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, StackConfigError> {
        serde_json::from_str(json)
    }
}

/// Assembles the recommended stack over a transport:
/// parallel limit innermost, then retry, then cache outermost.
///
/// Cache hits therefore never consume a retry or a concurrency slot, and
/// every retry attempt re-enters the concurrency queue as a new request.
#[derive(Debug, Clone, Default)]
pub struct RequestorStack {
    config: StackConfig,
}

impl RequestorStack {
    /// Creates a stack builder with the given settings.
    pub fn new(config: StackConfig) -> Self {
        Self { config }
    }

    /// The settings this stack applies.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Wraps `transport` in every enabled decorator.
    pub fn build<R>(&self, transport: R) -> Arc<dyn Requestor>
    where
        R: Requestor + 'static,
    {
        let config = &self.config;
        let mut requestor: Arc<dyn Requestor> = Arc::new(transport);

        if config.enable_parallel {
            requestor = Arc::new(
                ParallelLayer::builder()
                    .max_count(config.max_parallel)
                    .build()
                    .layer(requestor),
            );
        }

        if config.enable_retry {
            requestor = Arc::new(
                RetryConfig::builder()
                    .max_count(config.retry_count)
                    .delay(Duration::from_millis(config.retry_delay_ms))
                    .name("stack")
                    .build()
                    .layer()
                    .layer(requestor),
            );
        }

        if config.enable_cache {
            let keys = PathKey::new(&config.base_url);
            requestor = Arc::new(
                CacheLayer::builder()
                    .key_fn(move |request| keys.derive(request))
                    .duration(Duration::from_millis(config.cache_duration_ms))
                    .name("stack")
                    .build()
                    .layer(requestor),
            );
        }

        tracing::debug!(
            cache = config.enable_cache,
            retry = config.enable_retry,
            parallel = config.enable_parallel,
            "built requestor stack"
        );
        requestor
    }

    /// Wraps `transport` in a standalone idempotency decorator with default
    /// settings (fingerprint keys, 60 second window).
    #[cfg(feature = "idempotent")]
    pub fn idempotent<R>(transport: R) -> Arc<dyn Requestor>
    where
        R: Requestor + 'static,
    {
        use requestor_idempotent::IdempotentLayer;

        Arc::new(IdempotentLayer::builder().build().layer(transport))
    }
}
