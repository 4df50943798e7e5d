//! Concurrency-limiting decorator for requestors.
//!
//! A [`ParallelRequestor`] keeps at most `max_count` requests in flight
//! against its inner requestor. Everything else waits in a single FIFO
//! queue; a slot freed by a settled call always goes to the longest-waiting
//! request. Success and failure both free the slot.
//!
//! Requests retried by an outer retry decorator re-enter the queue as new
//! items and wait their turn like any other.
//!
//! # Basic Example
//!
//! ```rust
//! use requestor_parallel::ParallelLayer;
//! use requestor_core::{RequestConfig, RequestError, RequestOptions, RequestorExt, Response, ServiceRequestor};
//! use tower::Layer;
//!
//! # async fn example() -> Result<(), RequestError> {
//! let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
//!     Ok::<_, RequestError>(Response::ok(serde_json::Value::Null, config))
//! }));
//!
//! let limited = ParallelLayer::builder()
//!     .max_count(6)
//!     .on_dispatched(|in_flight, waited| println!("{in_flight} in flight after {waited:?}"))
//!     .build()
//!     .layer(transport);
//!
//! let pages = (1..=20).map(|page| limited.get("/api/items", RequestOptions::new().param("page", page)));
//! for response in futures::future::join_all(pages).await {
//!     response?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Runtime
//!
//! The first request spawns a dispatcher task onto the current Tokio
//! runtime. It invokes the inner requestor in admission order and drives
//! every call in flight, on either runtime flavor.

mod config;
pub mod events;
mod layer;
mod service;

pub use config::{ParallelConfig, ParallelConfigBuilder, DEFAULT_MAX_COUNT};
pub use events::ParallelEvent;
pub use layer::ParallelLayer;
pub use service::ParallelRequestor;
