//! Core contract for composable request decorators.
//!
//! This crate provides what every decorator crate shares:
//! - [`RequestConfig`], [`Response`] and the uniform [`RequestError`]
//! - the [`Requestor`] trait and its verb helpers ([`RequestorExt`])
//! - the lifecycle [`EventBus`] and the typed decorator event system
//! - deterministic key derivation ([`key`])
//! - tower bridges ([`ServiceRequestor`], [`RequestorService`])
//!
//! # Example
//!
//! ```
//! use requestor_core::{RequestConfig, RequestError, RequestOptions, RequestorExt, Response, ServiceRequestor};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), RequestError> {
//! let transport = ServiceRequestor::new(tower::service_fn(|config: RequestConfig| async move {
//!     Ok::<_, RequestError>(Response::ok(json!({"users": []}), config))
//! }));
//!
//! let response = transport.get("/api/users", RequestOptions::new()).await?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod error;
pub mod events;
pub mod key;
pub mod request;
pub mod requestor;
pub mod response;
pub mod service;

pub use bus::{EventBus, EventPayload, ListenerId};
pub use error::RequestError;
pub use events::{EventListener, EventListeners, FnListener, RequestorEvent};
pub use request::{Method, RequestConfig, RequestOptions};
pub use requestor::{Requestor, RequestorExt, ResponseFuture};
pub use response::{PlainResponse, Response};
pub use service::{RequestorService, ServiceRequestor};
