//! Composable request decorators over any transport.
//!
//! `requestor` wraps a transport (anything implementing
//! [`Requestor`](core::Requestor), usually a tower service adapted with
//! [`ServiceRequestor`](core::ServiceRequestor)) in decorators that each add
//! one behavior while keeping the same contract. Each decorator is available
//! as an individual crate and as a feature of this meta-crate.
//!
//! # Decorators
//!
//! - **Cache** (`cache` feature): answers repeated reads from a volatile or
//!   durable store
//! - **Retry** (`retry` feature): re-issues failed requests with linear backoff
//! - **Parallel** (`parallel` feature): caps requests in flight behind a FIFO queue
//! - **Idempotent** (`idempotent` feature): collapses duplicate submissions
//!
//! The `stack` feature adds [`RequestorStack`], which assembles the
//! recommended order (parallel limit innermost, then retry, then cache)
//! from a [`StackConfig`].
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! requestor = { version = "0.1", features = ["full"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "stack")]
//! # {
//! use requestor::core::{RequestConfig, RequestError, RequestOptions, RequestorExt, Response, ServiceRequestor};
//! use requestor::{RequestorStack, StackConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
//!     Ok::<_, RequestError>(Response::ok(serde_json::json!([]), config))
//! }));
//!
//! let config = StackConfig::from_json(r#"{"baseUrl": "https://api.example.com", "maxParallel": 2}"#)?;
//! let api = RequestorStack::new(config).build(transport);
//!
//! let users = api.get("/users", RequestOptions::new()).await?;
//! # Ok(())
//! # }
//! # }
//! ```
//!
//! # Ordering
//!
//! Order changes behavior. With the cache outermost, hits never consume a
//! retry or a concurrency slot. With the cache inside the retry, every
//! attempt is checked against the cache on its own. Any order can be built
//! directly from the layers.

// Re-export core and stores (always available)
pub use requestor_core as core;
pub use requestor_store as store;

// Re-export decorators based on features
#[cfg(feature = "cache")]
pub use requestor_cache as cache;

#[cfg(feature = "idempotent")]
pub use requestor_idempotent as idempotent;

#[cfg(feature = "parallel")]
pub use requestor_parallel as parallel;

#[cfg(feature = "retry")]
pub use requestor_retry as retry;

#[cfg(feature = "stack")]
mod stack;

#[cfg(feature = "stack")]
pub use stack::{RequestorStack, StackConfig, StackConfigError};
