//! Configuration for the concurrency decorator.

use crate::events::ParallelEvent;
use requestor_core::{EventListeners, FnListener};
use std::time::Duration;

/// Default cap on in-flight requests.
pub const DEFAULT_MAX_COUNT: usize = 4;

/// Configuration for the concurrency decorator.
#[derive(Clone)]
pub struct ParallelConfig {
    /// Maximum number of requests in flight at once. Never zero.
    pub(crate) max_count: usize,
    /// Name of this instance.
    pub(crate) name: String,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<ParallelEvent>,
}

impl ParallelConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ParallelConfigBuilder {
        ParallelConfigBuilder::new()
    }

    /// The in-flight cap.
    pub fn max_count(&self) -> usize {
        self.max_count
    }
}

/// Builder for concurrency decorator configuration.
pub struct ParallelConfigBuilder {
    max_count: usize,
    name: String,
    event_listeners: EventListeners<ParallelEvent>,
}

impl ParallelConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            name: "parallel".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the maximum number of requests in flight at once.
    ///
    /// Zero is raised to one. Default: 4
    pub fn max_count(mut self, max: usize) -> Self {
        self.max_count = max.max(1);
        self
    }

    /// Sets the name of this instance.
    ///
    /// Default: "parallel"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a request joins the queue.
    ///
    /// # Callback Signature
    /// `Fn(usize)` - Called with the queue length, including the new request.
    pub fn on_enqueued<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let ParallelEvent::Enqueued { queue_len, .. } = event {
                f(*queue_len);
            }
        }));
        self
    }

    /// Registers a callback when a request is dispatched.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)` - Called with the in-flight count including this
    /// request (between 1 and `max_count`) and the time it spent queued.
    pub fn on_dispatched<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let ParallelEvent::Dispatched {
                in_flight, waited, ..
            } = event
            {
                f(*in_flight, *waited);
            }
        }));
        self
    }

    /// Registers a callback when a dispatched request settles.
    ///
    /// # Callback Signature
    /// `Fn(Duration, bool)` - Called with the time spent in the inner
    /// requestor and whether it succeeded.
    pub fn on_finished<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration, bool) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let ParallelEvent::Finished {
                duration,
                succeeded,
                ..
            } = event
            {
                f(*duration, *succeeded);
            }
        }));
        self
    }

    /// Builds the concurrency layer.
    pub fn build(self) -> crate::ParallelLayer {
        crate::ParallelLayer::new(self.into_config())
    }

    pub(crate) fn into_config(self) -> ParallelConfig {
        ParallelConfig {
            max_count: self.max_count,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for ParallelConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
