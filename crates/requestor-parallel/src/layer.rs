//! Concurrency decorator layer.

use crate::config::ParallelConfig;
use crate::ParallelRequestor;
use requestor_core::Requestor;
use tower::Layer;

/// A Tower [`Layer`] that wraps a requestor with a [`ParallelRequestor`].
///
/// Each call to [`layer()`](Layer::layer) creates an independent queue and
/// in-flight counter.
#[derive(Clone)]
pub struct ParallelLayer {
    config: ParallelConfig,
}

impl ParallelLayer {
    /// Creates a new concurrency layer with the given configuration.
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Creates a new builder for configuring a concurrency layer.
    pub fn builder() -> crate::ParallelConfigBuilder {
        crate::ParallelConfigBuilder::new()
    }
}

impl<R: Requestor + 'static> Layer<R> for ParallelLayer {
    type Service = ParallelRequestor<R>;

    fn layer(&self, inner: R) -> Self::Service {
        ParallelRequestor::new(inner, self.config.clone())
    }
}
