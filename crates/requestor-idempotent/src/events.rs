use requestor_core::RequestorEvent;
use std::time::Instant;

/// Events emitted by the idempotency decorator.
#[derive(Debug, Clone)]
pub enum IdempotentEvent {
    /// A repeat of a recently settled request was answered from the store.
    Duplicate {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A repeat of a request still in flight joined the first submission.
    Coalesced {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
}

impl RequestorEvent for IdempotentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            IdempotentEvent::Duplicate { .. } => "Duplicate",
            IdempotentEvent::Coalesced { .. } => "Coalesced",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            IdempotentEvent::Duplicate { timestamp, .. }
            | IdempotentEvent::Coalesced { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            IdempotentEvent::Duplicate { pattern_name, .. }
            | IdempotentEvent::Coalesced { pattern_name, .. } => pattern_name,
        }
    }
}
