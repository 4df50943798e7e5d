//! Events emitted by the concurrency decorator.

use requestor_core::RequestorEvent;
use std::time::{Duration, Instant};

/// Events emitted by the concurrency decorator.
#[derive(Debug, Clone)]
pub enum ParallelEvent {
    /// A request joined the queue. `queue_len` includes it.
    Enqueued {
        pattern_name: String,
        timestamp: Instant,
        queue_len: usize,
    },
    /// A request left the queue and was dispatched to the inner requestor.
    Dispatched {
        pattern_name: String,
        timestamp: Instant,
        in_flight: usize,
        waited: Duration,
    },
    /// A dispatched request settled and released its slot.
    Finished {
        pattern_name: String,
        timestamp: Instant,
        duration: Duration,
        succeeded: bool,
    },
}

impl RequestorEvent for ParallelEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ParallelEvent::Enqueued { .. } => "Enqueued",
            ParallelEvent::Dispatched { .. } => "Dispatched",
            ParallelEvent::Finished { .. } => "Finished",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ParallelEvent::Enqueued { timestamp, .. }
            | ParallelEvent::Dispatched { timestamp, .. }
            | ParallelEvent::Finished { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            ParallelEvent::Enqueued { pattern_name, .. }
            | ParallelEvent::Dispatched { pattern_name, .. }
            | ParallelEvent::Finished { pattern_name, .. } => pattern_name,
        }
    }
}
