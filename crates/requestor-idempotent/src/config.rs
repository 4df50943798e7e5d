//! Configuration for the idempotency decorator.

use crate::events::IdempotentEvent;
use requestor_cache::CacheLayer;
use requestor_core::key::fingerprint;
use requestor_core::{EventListeners, FnListener, RequestConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default window in which a repeat counts as a duplicate.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);

/// Derives the idempotency key of a request.
pub type KeyGenerator = Arc<dyn Fn(&RequestConfig) -> String + Send + Sync>;

/// Configuration for the idempotency decorator.
pub struct IdempotentConfig {
    pub(crate) gen_key: KeyGenerator,
    pub(crate) duration: Duration,
    pub(crate) coalesce_in_flight: bool,
    pub(crate) event_listeners: EventListeners<IdempotentEvent>,
    pub(crate) name: String,
}

impl IdempotentConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> IdempotentConfigBuilder {
        IdempotentConfigBuilder::new()
    }

    /// How long a settled request suppresses its duplicates.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether duplicates of an unsettled request wait for it.
    pub fn coalesces_in_flight(&self) -> bool {
        self.coalesce_in_flight
    }
}

/// Builder for the idempotency decorator.
pub struct IdempotentConfigBuilder {
    gen_key: KeyGenerator,
    duration: Duration,
    coalesce_in_flight: bool,
    event_listeners: EventListeners<IdempotentEvent>,
    name: String,
}

impl IdempotentConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            gen_key: Arc::new(fingerprint),
            duration: DEFAULT_DURATION,
            coalesce_in_flight: true,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the key generator.
    ///
    /// Default: [`fingerprint`] (hash of url, method, headers, body and params).
    pub fn gen_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestConfig) -> String + Send + Sync + 'static,
    {
        self.gen_key = Arc::new(f);
        self
    }

    /// Sets how long a settled request suppresses its duplicates.
    ///
    /// Default: 60 seconds
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether duplicates arriving while the first submission is still in
    /// flight wait for its outcome instead of issuing their own call.
    ///
    /// Default: true
    pub fn coalesce_in_flight(mut self, enabled: bool) -> Self {
        self.coalesce_in_flight = enabled;
        self
    }

    /// Sets the name of this instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with the key when a duplicate is
    /// answered from the store.
    pub fn on_duplicate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let IdempotentEvent::Duplicate { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key when a duplicate joins an
    /// in-flight submission.
    pub fn on_coalesced<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let IdempotentEvent::Coalesced { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Builds the idempotency layer.
    pub fn build(self) -> crate::IdempotentLayer {
        let listeners = self.event_listeners.clone();
        let name = self.name.clone();
        let gen_key = Arc::clone(&self.gen_key);

        // Settled duplicates are answered by a volatile cache keyed the same way.
        let cache = CacheLayer::builder()
            .key_fn(move |config| gen_key(config))
            .duration(self.duration)
            .memory()
            .name(self.name.clone())
            .on_hit(move |key| {
                listeners.emit(&IdempotentEvent::Duplicate {
                    pattern_name: name.clone(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
            })
            .build();

        crate::IdempotentLayer::new(
            cache,
            IdempotentConfig {
                gen_key: self.gen_key,
                duration: self.duration,
                coalesce_in_flight: self.coalesce_in_flight,
                event_listeners: self.event_listeners,
                name: self.name,
            },
        )
    }
}

impl Default for IdempotentConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
