//! Typed events emitted by decorators.
//!
//! Each decorator defines its own event enum (cache hits, retry attempts,
//! queue admissions) and keeps an [`EventListeners`] collection built from
//! its config builder. This is separate from the string-keyed lifecycle
//! [`EventBus`](crate::EventBus) shared by a whole stack.

use std::fmt;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// An event raised by one decorator instance.
pub trait RequestorEvent: Send + Sync + fmt::Debug {
    /// Short variant tag such as `"Hit"` or `"Retry"`.
    fn event_type(&self) -> &'static str;

    /// When the event was raised.
    fn timestamp(&self) -> Instant;

    /// The `name` the emitting decorator was configured with.
    fn pattern_name(&self) -> &str;
}

/// Receives the typed events of one decorator.
pub trait EventListener<E: RequestorEvent>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// Shared handle to a listener.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// Listeners registered on a decorator config, called in registration order.
///
/// Cloning is cheap; clones share the registered listeners.
pub struct EventListeners<E: RequestorEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: RequestorEvent> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: RequestorEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers `listener` after any already present.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener.
    ///
    /// A listener that panics is logged and skipped; later listeners still
    /// see the event.
    pub fn emit(&self, event: &E) {
        for (index, listener) in self.listeners.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| listener.on_event(event))).is_err() {
                tracing::error!(
                    pattern = event.pattern_name(),
                    event = event.event_type(),
                    listener = index,
                    "event listener panicked"
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: RequestorEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RequestorEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure into an [`EventListener`].
///
/// Builder hooks such as `on_hit` wrap their callback in one of these,
/// matching on the event variant they care about.
pub struct FnListener<E, F> {
    callback: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _event: PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: RequestorEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.callback)(event);
    }
}
