use requestor_core::RequestorEvent;
use std::time::Instant;

/// Events emitted by the cache decorator.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A fresh, valid entry answered the request.
    Hit {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// No usable entry; the request goes to the inner requestor.
    Miss {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A successful response was written to the store.
    Stored {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
}

impl CacheEvent {
    /// The cache key this event concerns.
    pub fn key(&self) -> &str {
        match self {
            CacheEvent::Hit { key, .. }
            | CacheEvent::Miss { key, .. }
            | CacheEvent::Stored { key, .. } => key,
        }
    }
}

impl RequestorEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "Hit",
            CacheEvent::Miss { .. } => "Miss",
            CacheEvent::Stored { .. } => "Stored",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Stored { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            CacheEvent::Hit { pattern_name, .. }
            | CacheEvent::Miss { pattern_name, .. }
            | CacheEvent::Stored { pattern_name, .. } => pattern_name,
        }
    }
}
