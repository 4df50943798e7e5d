//! Bridges between [`Requestor`] and `tower::Service`.
//!
//! A transport is any `tower::Service<RequestConfig>` answering with
//! [`Response`] / [`RequestError`]. [`ServiceRequestor`] turns it into the
//! bottom of a decorator stack and owns the stack's [`EventBus`].
//! [`RequestorService`] goes the other way, so a finished stack can be
//! handed to code that expects a tower service.

use crate::bus::{EventBus, EventPayload, BEFORE_REQUEST, REQUEST_ERROR, RESPONSE, RESPONSE_ERROR};
use crate::error::RequestError;
use crate::request::RequestConfig;
use crate::requestor::{Requestor, ResponseFuture};
use crate::response::Response;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Service, ServiceExt};

/// A [`Requestor`] backed by a tower service.
///
/// Every call emits `beforeRequest` on the owned bus. A service that fails
/// to become ready emits `requestError` and is never called. Otherwise the
/// call emits `response` or `responseError`.
pub struct ServiceRequestor<S> {
    service: S,
    events: EventBus,
}

impl<S> ServiceRequestor<S> {
    /// Wraps `service` with a fresh event bus.
    pub fn new(service: S) -> Self {
        Self {
            service,
            events: EventBus::new(),
        }
    }

    /// Returns the wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.service
    }
}

impl<S> Requestor for ServiceRequestor<S>
where
    S: Service<RequestConfig, Response = Response, Error = RequestError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        let mut service = self.service.clone();
        Box::pin(async move {
            self.events
                .emit(BEFORE_REQUEST, &EventPayload::Request(config.clone()));

            let ready = match service.ready().await {
                Ok(ready) => ready,
                Err(error) => {
                    tracing::debug!(url = %config.url, error = %error, "transport not ready");
                    self.events
                        .emit(REQUEST_ERROR, &EventPayload::Error(error.clone()));
                    return Err(error);
                }
            };

            match ready.call(config).await {
                Ok(response) => {
                    self.events
                        .emit(RESPONSE, &EventPayload::Response(response.clone()));
                    Ok(response)
                }
                Err(error) => {
                    tracing::debug!(error = %error, "transport call failed");
                    self.events
                        .emit(RESPONSE_ERROR, &EventPayload::Error(error.clone()));
                    Err(error)
                }
            }
        })
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}

/// A tower service backed by a [`Requestor`]. Always ready.
pub struct RequestorService<R: ?Sized> {
    inner: Arc<R>,
}

impl<R: ?Sized> RequestorService<R> {
    /// Wraps a shared requestor.
    pub fn new(inner: Arc<R>) -> Self {
        Self { inner }
    }
}

impl<R: ?Sized> Clone for RequestorService<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Service<RequestConfig> for RequestorService<R>
where
    R: Requestor + ?Sized + 'static,
{
    type Response = Response;
    type Error = RequestError;
    type Future = BoxFuture<'static, Result<Response, RequestError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, config: RequestConfig) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.request(config).await })
    }
}
