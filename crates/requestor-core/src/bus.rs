//! Lifecycle pub/sub owned by a transport and shared by every decorator
//! wrapped around it.

use crate::error::RequestError;
use crate::request::RequestConfig;
use crate::response::Response;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Emitted with the outgoing [`RequestConfig`] before the transport is called.
pub const BEFORE_REQUEST: &str = "beforeRequest";
/// Emitted with the [`Response`] after a successful transport call.
pub const RESPONSE: &str = "response";
/// Emitted with the [`RequestError`] after a failed transport call.
pub const RESPONSE_ERROR: &str = "responseError";
/// Emitted with the [`RequestError`] when the transport could not accept
/// the request, so nothing was sent.
pub const REQUEST_ERROR: &str = "requestError";

/// Argument passed to lifecycle handlers.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// An outgoing request.
    Request(RequestConfig),
    /// A completed response.
    Response(Response),
    /// A failure.
    Error(RequestError),
    /// Anything else an application chooses to emit.
    Value(Value),
}

/// Handle returned by [`EventBus::on`], used to unregister the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// String-keyed event bus.
///
/// Handlers for one event name run in registration order. A handler that
/// panics is logged and skipped; the others still run.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<(ListenerId, Handler)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `event`.
    pub fn on<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes a handler. Returns `false` if it was not registered for `event`.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    /// Calls every handler registered for `event`.
    pub fn emit(&self, event: &str, payload: &EventPayload) {
        // Snapshot so handlers may call on/off without deadlocking.
        let snapshot: Vec<Handler> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            match handlers.get(event) {
                Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        for handler in snapshot {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(payload);
            }));
            if outcome.is_err() {
                tracing::error!(event = %event, "lifecycle event handler panicked");
            }
        }
    }

    /// Returns the number of handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = handlers.keys().collect();
        names.sort();
        f.debug_struct("EventBus").field("events", &names).finish()
    }
}
