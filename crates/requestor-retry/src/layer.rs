use crate::{RetryConfig, RetryRequestor};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that wraps a requestor with a [`RetryRequestor`].
///
/// # Examples
///
/// ```
/// use requestor_retry::{ExponentialBackoff, RetryLayer};
/// use std::time::Duration;
///
/// let retry_layer = RetryLayer::builder()
///     .max_count(5)
///     .backoff(ExponentialBackoff::new(Duration::from_millis(100)))
///     .build()
///     .layer();
/// ```
#[derive(Clone)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

impl RetryLayer {
    /// Creates a new `RetryLayer` with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a retry layer.
    pub fn builder() -> crate::RetryConfigBuilder {
        crate::RetryConfigBuilder::new()
    }
}

impl<R> Layer<R> for RetryLayer {
    type Service = RetryRequestor<R>;

    fn layer(&self, inner: R) -> Self::Service {
        RetryRequestor::new(inner, Arc::clone(&self.config))
    }
}
