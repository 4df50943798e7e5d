use crate::{CacheConfig, CacheRequestor};
use std::sync::Arc;
use tower::Layer;

/// A Tower [`Layer`] that wraps a requestor with a [`CacheRequestor`].
///
/// # Store ownership
///
/// Each call to [`layer()`](Layer::layer) opens a new store: memory caches
/// are never shared between wrapped requestors. Persistent caches open a
/// new view over the same durable storage. To share one store on purpose,
/// configure it with [`store()`](crate::CacheConfigBuilder::store).
///
/// # Examples
///
/// ```
/// use requestor_cache::CacheLayer;
/// use requestor_core::{RequestConfig, RequestError, Response, ServiceRequestor};
/// use std::time::Duration;
/// use tower::ServiceBuilder;
///
/// let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
///     Ok::<_, RequestError>(Response::ok(serde_json::json!([]), config))
/// }));
///
/// let cached = ServiceBuilder::new()
///     .layer(CacheLayer::builder().duration(Duration::from_secs(60)).build())
///     .service(transport);
/// ```
#[derive(Clone)]
pub struct CacheLayer {
    config: Arc<CacheConfig>,
}

impl CacheLayer {
    /// Creates a new `CacheLayer` with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a cache layer.
    pub fn builder() -> crate::CacheConfigBuilder {
        crate::CacheConfigBuilder::new()
    }
}

impl<R> Layer<R> for CacheLayer {
    type Service = CacheRequestor<R>;

    fn layer(&self, inner: R) -> Self::Service {
        CacheRequestor::new(inner, Arc::clone(&self.config))
    }
}
