//! Tracking of requests whose first submission has not settled yet.

use hashbrown::HashMap;
use parking_lot::Mutex;
use requestor_core::{RequestError, Response};
use std::sync::Arc;
use tokio::sync::broadcast;

type Outcome = Result<Response, RequestError>;

/// Map from fingerprint to the channel its leader will publish on.
pub(crate) struct InFlight {
    requests: Mutex<HashMap<String, broadcast::Sender<Outcome>>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Becomes the leader for `key` (returns `None`), or subscribes to the
    /// current leader's outcome.
    pub(crate) fn try_join(&self, key: &str) -> Option<broadcast::Receiver<Outcome>> {
        let mut requests = self.requests.lock();
        if let Some(sender) = requests.get(key) {
            Some(sender.subscribe())
        } else {
            // Capacity 1: exactly one outcome is ever sent.
            let (tx, _rx) = broadcast::channel(1);
            requests.insert(key.to_string(), tx);
            None
        }
    }

    /// Publishes the leader's outcome and releases the key.
    fn complete(&self, key: &str, outcome: Outcome) {
        let sender = self.requests.lock().remove(key);
        if let Some(sender) = sender {
            // No subscribers is fine.
            let _ = sender.send(outcome);
        }
    }

    /// Releases the key without an outcome; waiters see a closed channel.
    fn cancel(&self, key: &str) {
        self.requests.lock().remove(key);
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.lock().len()
    }
}

/// Held by the leader while its request runs. Dropping it without
/// [`complete`](LeaderGuard::complete) cancels the key.
pub(crate) struct LeaderGuard {
    in_flight: Arc<InFlight>,
    key: Option<String>,
}

impl LeaderGuard {
    pub(crate) fn new(in_flight: Arc<InFlight>, key: String) -> Self {
        Self {
            in_flight,
            key: Some(key),
        }
    }

    pub(crate) fn complete(mut self, outcome: &Outcome) {
        if let Some(key) = self.key.take() {
            self.in_flight.complete(&key, outcome.clone());
        }
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.in_flight.cancel(&key);
        }
    }
}
