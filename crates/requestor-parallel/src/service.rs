//! Concurrency decorator implementation.

use crate::config::ParallelConfig;
use crate::events::ParallelEvent;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use requestor_core::{EventBus, RequestConfig, RequestError, Requestor, Response, ResponseFuture};
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

type Responder = oneshot::Sender<Result<Response, RequestError>>;

struct QueueItem {
    config: RequestConfig,
    responder: Responder,
    enqueued_at: Instant,
}

/// An admitted request on its way to the dispatcher, holding its slot.
struct Call<R: Requestor + 'static> {
    item: QueueItem,
    slot: Slot<R>,
    /// In-flight count when admitted, this call included.
    in_flight: usize,
}

struct QueueState<R: Requestor + 'static> {
    queue: VecDeque<QueueItem>,
    in_flight: usize,
    dispatcher: Option<mpsc::UnboundedSender<Call<R>>>,
}

struct Shared<R: Requestor + 'static> {
    inner: R,
    state: Mutex<QueueState<R>>,
    config: ParallelConfig,
}

/// A [`Requestor`] that keeps at most `max_count` requests in flight.
///
/// Every request joins one FIFO queue and is dispatched in enqueue order as
/// slots free up. Completion order is not guaranteed. Requests are queued
/// when [`request`](Requestor::request) is called, before the returned
/// future is polled.
///
/// Admitted calls are handed, in admission order, to a single dispatcher
/// task that invokes the inner requestor and drives every call in flight.
/// The dispatcher is spawned on the current Tokio runtime by the first
/// request, so this decorator must be used inside one. Dropping the
/// caller's future does not cancel a dispatched call; its slot is released
/// when it settles. A queued request whose caller has gone away is skipped.
pub struct ParallelRequestor<R: Requestor + 'static> {
    shared: Arc<Shared<R>>,
}

impl<R: Requestor + 'static> ParallelRequestor<R> {
    /// Creates a new concurrency decorator wrapping `inner`.
    pub(crate) fn new(inner: R, config: ParallelConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner,
                state: Mutex::new(QueueState {
                    queue: VecDeque::new(),
                    in_flight: 0,
                    dispatcher: None,
                }),
                config,
            }),
        }
    }

    /// Requests currently dispatched and unsettled.
    pub fn in_flight(&self) -> usize {
        self.shared.lock().in_flight
    }

    /// Requests waiting for a slot.
    pub fn queued(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// The in-flight cap.
    pub fn max_count(&self) -> usize {
        self.shared.config.max_count
    }

    /// The wrapped requestor.
    pub fn get_ref(&self) -> &R {
        &self.shared.inner
    }

    /// Starts a dispatcher unless one is already running.
    fn ensure_dispatcher(&self) {
        let mut state = self.shared.lock();
        if state
            .dispatcher
            .as_ref()
            .is_some_and(|dispatcher| !dispatcher.is_closed())
        {
            return;
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        state.dispatcher = Some(sender);
        drop(state);

        tracing::debug!(parallel = %self.shared.config.name, "starting dispatcher");
        tokio::spawn(dispatch(receiver));
    }
}

impl<R: Requestor + 'static> Drop for ParallelRequestor<R> {
    fn drop(&mut self) {
        // Closing the channel lets the dispatcher finish the calls it holds and exit.
        self.shared.lock().dispatcher = None;
    }
}

/// Drives admitted calls. Each call is pushed in the order it was
/// admitted, so the inner requestor is first invoked in that order.
async fn dispatch<R: Requestor + 'static>(mut admitted: mpsc::UnboundedReceiver<Call<R>>) {
    let mut running = FuturesUnordered::new();
    loop {
        tokio::select! {
            call = admitted.recv() => match call {
                Some(call) => running.push(call.run()),
                None => break,
            },
            Some(()) = running.next(), if !running.is_empty() => {}
        }
    }
    while running.next().await.is_some() {}
}

impl<R: Requestor + 'static> Call<R> {
    async fn run(self) {
        let Call {
            item,
            slot,
            in_flight,
        } = self;
        let shared = &slot.shared;

        tracing::debug!(
            parallel = %shared.config.name,
            url = %item.config.url,
            in_flight,
            "dispatching request"
        );
        shared.config.event_listeners.emit(&ParallelEvent::Dispatched {
            pattern_name: shared.config.name.clone(),
            timestamp: Instant::now(),
            in_flight,
            waited: item.enqueued_at.elapsed(),
        });

        let started = Instant::now();

        let outcome = AssertUnwindSafe(shared.inner.request(item.config))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(result) => Some(result),
            Err(_) => {
                tracing::error!(parallel = %shared.config.name, "dispatched request panicked");
                None
            }
        };
        let succeeded = matches!(result, Some(Ok(_)));

        #[cfg(feature = "metrics")]
        {
            let outcome = if succeeded { "success" } else { "failure" };
            counter!("parallel_calls_total", "parallel" => shared.config.name.clone(), "result" => outcome)
                .increment(1);
        }

        shared.config.event_listeners.emit(&ParallelEvent::Finished {
            pattern_name: shared.config.name.clone(),
            timestamp: Instant::now(),
            duration: started.elapsed(),
            succeeded,
        });

        // Free the slot before the caller wakes, so a settled caller never
        // observes its own call as in flight.
        drop(slot);

        // The caller may have stopped waiting. A panicked call drops the
        // responder, which the caller sees as an error.
        if let Some(result) = result {
            let _ = item.responder.send(result);
        }
    }
}

impl<R: Requestor + 'static> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, QueueState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, item: QueueItem) {
        let queue_len = {
            let mut state = self.lock();
            state.queue.push_back(item);
            state.queue.len()
        };

        #[cfg(feature = "metrics")]
        gauge!("parallel_queue_depth", "parallel" => self.config.name.clone())
            .set(queue_len as f64);

        self.config.event_listeners.emit(&ParallelEvent::Enqueued {
            pattern_name: self.config.name.clone(),
            timestamp: Instant::now(),
            queue_len,
        });
    }

    fn release(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);

        #[cfg(feature = "metrics")]
        gauge!("parallel_in_flight", "parallel" => self.config.name.clone())
            .set(state.in_flight as f64);
    }

    /// Admits queued requests until the cap is reached or the queue is empty.
    ///
    /// Admission and the hand-off to the dispatcher happen under one lock,
    /// so the dispatcher receives calls in queue order whichever thread
    /// drains.
    fn drain(self: &Arc<Self>) {
        let mut rejected = None;
        {
            let mut state = self.lock();
            let Some(dispatcher) = state.dispatcher.clone() else {
                return;
            };
            while state.in_flight < self.config.max_count {
                let Some(item) = state.queue.pop_front() else {
                    break;
                };
                if item.responder.is_closed() {
                    tracing::debug!(parallel = %self.config.name, url = %item.config.url, "skipping abandoned request");
                    continue;
                }
                state.in_flight += 1;
                let call = Call {
                    item,
                    slot: Slot {
                        shared: Arc::clone(self),
                    },
                    in_flight: state.in_flight,
                };
                if let Err(mpsc::error::SendError(call)) = dispatcher.send(call) {
                    // The dispatcher is gone; the next request starts a new one.
                    state.dispatcher = None;
                    rejected = Some(call);
                    break;
                }
            }

            #[cfg(feature = "metrics")]
            {
                gauge!("parallel_in_flight", "parallel" => self.config.name.clone())
                    .set(state.in_flight as f64);
                gauge!("parallel_queue_depth", "parallel" => self.config.name.clone())
                    .set(state.queue.len() as f64);
            }
        }
        // Released outside the lock.
        drop(rejected);
    }
}

/// A claimed in-flight slot. Released on drop, including when the call is
/// dropped unsettled, and the queue is drained again.
struct Slot<R: Requestor + 'static> {
    shared: Arc<Shared<R>>,
}

impl<R: Requestor + 'static> Drop for Slot<R> {
    fn drop(&mut self) {
        self.shared.release();
        self.shared.drain();
    }
}

impl<R: Requestor + 'static> Requestor for ParallelRequestor<R> {
    fn request(&self, config: RequestConfig) -> ResponseFuture<'_> {
        let (responder, receiver) = oneshot::channel();
        self.shared.enqueue(QueueItem {
            config,
            responder,
            enqueued_at: Instant::now(),
        });
        self.ensure_dispatcher();
        self.shared.drain();

        Box::pin(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(RequestError::other("request dropped before it settled")))
        })
    }

    fn events(&self) -> &EventBus {
        self.shared.inner.events()
    }
}
