//! The `Requestor` contract.

use crate::bus::{EventBus, EventPayload, ListenerId};
use crate::error::RequestError;
use crate::request::{Method, RequestConfig, RequestOptions};
use crate::response::Response;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// Future returned by [`Requestor::request`].
pub type ResponseFuture<'a> = BoxFuture<'a, Result<Response, RequestError>>;

/// A uniform request-issuing contract.
///
/// Implemented by transports (see [`ServiceRequestor`](crate::ServiceRequestor))
/// and by every decorator. Decorators take their inner requestor by value at
/// construction and forward [`events`](Requestor::events) to it, so one
/// [`EventBus`] serves the whole stack.
///
/// The verb helpers (`get`, `post`, ...) live on [`RequestorExt`] and always
/// funnel into [`request`](Requestor::request).
pub trait Requestor: Send + Sync {
    /// Issues a request.
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_>;

    /// The lifecycle event bus of this stack.
    fn events(&self) -> &EventBus;

    /// Registers a lifecycle handler.
    fn on(&self, event: &str, handler: Arc<dyn Fn(&EventPayload) + Send + Sync>) -> ListenerId {
        self.events().on(event, move |payload| handler(payload))
    }

    /// Removes a lifecycle handler.
    fn off(&self, event: &str, id: ListenerId) -> bool {
        self.events().off(event, id)
    }

    /// Emits a lifecycle event.
    fn emit(&self, event: &str, payload: &EventPayload) {
        self.events().emit(event, payload)
    }
}

/// Verb helpers, available on every [`Requestor`].
///
/// Blanket-implemented, so no requestor can route a verb around its own
/// `request`.
pub trait RequestorExt: Requestor {
    /// `GET url`.
    fn get(&self, url: &str, options: RequestOptions) -> ResponseFuture<'_> {
        self.request(options.into_config(Method::Get, url, None))
    }

    /// `POST url` with an optional body.
    fn post(&self, url: &str, body: Option<Value>, options: RequestOptions) -> ResponseFuture<'_> {
        self.request(options.into_config(Method::Post, url, body))
    }

    /// `PUT url` with an optional body.
    fn put(&self, url: &str, body: Option<Value>, options: RequestOptions) -> ResponseFuture<'_> {
        self.request(options.into_config(Method::Put, url, body))
    }

    /// `DELETE url`.
    fn delete(&self, url: &str, options: RequestOptions) -> ResponseFuture<'_> {
        self.request(options.into_config(Method::Delete, url, None))
    }

    /// `PATCH url` with an optional body.
    fn patch(&self, url: &str, body: Option<Value>, options: RequestOptions) -> ResponseFuture<'_> {
        self.request(options.into_config(Method::Patch, url, body))
    }
}

impl<R: Requestor + ?Sized> RequestorExt for R {}

impl<R: Requestor + ?Sized> Requestor for Arc<R> {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        (**self).request(config)
    }

    fn events(&self) -> &EventBus {
        (**self).events()
    }
}

impl<R: Requestor + ?Sized> Requestor for Box<R> {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        (**self).request(config)
    }

    fn events(&self) -> &EventBus {
        (**self).events()
    }
}

impl<R: Requestor + ?Sized> Requestor for &R {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        (**self).request(config)
    }

    fn events(&self) -> &EventBus {
        (**self).events()
    }
}
