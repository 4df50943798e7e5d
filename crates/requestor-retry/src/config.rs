//! Configuration for the retry decorator.

use crate::backoff::{IntervalFunction, LinearBackoff};
use crate::events::RetryEvent;
use requestor_core::{EventListeners, FnListener, RequestError};
use std::sync::Arc;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_COUNT: usize = 3;

/// Default base delay of the linear backoff.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Decides whether a failed attempt is retried.
///
/// Receives the error and the number of retries already made.
pub type RetryPredicate = Arc<dyn Fn(&RequestError, usize) -> bool + Send + Sync>;

/// Default predicate: retry when no response came back, or on a 5xx status.
pub fn is_transient(error: &RequestError, _retries: usize) -> bool {
    match error.status_code() {
        None => true,
        Some(status) => (500..600).contains(&status),
    }
}

/// Configuration for the retry decorator.
pub struct RetryConfig {
    pub(crate) max_count: usize,
    pub(crate) interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) should_retry: RetryPredicate,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl RetryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Creates a layer from this configuration.
    pub fn layer(self) -> crate::RetryLayer {
        crate::RetryLayer::new(self)
    }

    /// Retries allowed after the first attempt.
    pub fn max_count(&self) -> usize {
        self.max_count
    }
}

/// Builder for configuring and constructing a retry decorator.
pub struct RetryConfigBuilder {
    max_count: usize,
    delay: Duration,
    interval_fn: Option<Arc<dyn IntervalFunction>>,
    should_retry: RetryPredicate,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl RetryConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            delay: DEFAULT_DELAY,
            interval_fn: None,
            should_retry: Arc::new(is_transient),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets how many retries follow a failed first attempt.
    ///
    /// A request is tried at most `max_count + 1` times.
    /// Default: 3
    pub fn max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Sets the base delay of the default linear backoff.
    ///
    /// The n-th retry waits `delay * n`. Ignored when
    /// [`backoff`](Self::backoff) is set. Default: 1000 ms
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replaces the linear backoff with a custom strategy.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval_fn = Some(Arc::new(interval_fn));
        self
    }

    /// Sets the predicate that decides whether an error is retried.
    ///
    /// Default: [`is_transient`].
    pub fn should_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestError, usize) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(f);
        self
    }

    /// Sets the name of this retry instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked before each retry with the retry
    /// number (from 1) and the wait.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked on success with the total attempts.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when all attempts have failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when the predicate declines a retry.
    pub fn on_ignored_error<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, RetryEvent::IgnoredError { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RetryConfig {
        let interval_fn = self
            .interval_fn
            .unwrap_or_else(|| Arc::new(LinearBackoff::new(self.delay)));

        RetryConfig {
            max_count: self.max_count,
            interval_fn,
            should_retry: self.should_retry,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
