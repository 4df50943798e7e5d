use crate::{IdempotentConfig, IdempotentRequestor};
use requestor_cache::CacheLayer;
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that wraps a requestor with an [`IdempotentRequestor`].
///
/// Each wrapped requestor gets its own store and its own in-flight table.
#[derive(Clone)]
pub struct IdempotentLayer {
    cache: CacheLayer,
    config: Arc<IdempotentConfig>,
}

impl IdempotentLayer {
    pub(crate) fn new(cache: CacheLayer, config: IdempotentConfig) -> Self {
        Self {
            cache,
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring an idempotency layer.
    pub fn builder() -> crate::IdempotentConfigBuilder {
        crate::IdempotentConfigBuilder::new()
    }

    /// The settings this layer applies.
    pub fn config(&self) -> &IdempotentConfig {
        &self.config
    }
}

impl<R> Layer<R> for IdempotentLayer {
    type Service = IdempotentRequestor<R>;

    fn layer(&self, inner: R) -> Self::Service {
        IdempotentRequestor::new(self.cache.layer(inner), Arc::clone(&self.config))
    }
}
