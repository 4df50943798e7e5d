//! Transports shared by the integration tests.

#![allow(dead_code)]

use requestor_core::{RequestConfig, RequestError, Requestor, Response, ServiceRequestor};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Routes `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Counts calls and answers with `{"call": n, "url": ..}`.
pub fn echo_transport(calls: Arc<AtomicUsize>) -> impl Requestor {
    ServiceRequestor::new(tower::service_fn(move |config: RequestConfig| {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            let url = config.url.clone();
            Ok::<_, RequestError>(Response::ok(json!({"call": n, "url": url}), config))
        }
    }))
}

/// Like [`echo_transport`] but each call takes `latency`.
pub fn slow_transport(calls: Arc<AtomicUsize>, latency: Duration) -> impl Requestor {
    ServiceRequestor::new(tower::service_fn(move |config: RequestConfig| {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            tokio::time::sleep(latency).await;
            let url = config.url.clone();
            Ok::<_, RequestError>(Response::ok(json!({"call": n, "url": url}), config))
        }
    }))
}

/// Fails the first `failures` calls with `status` (network error when
/// `status` is `None`), then succeeds.
pub fn flaky_transport(
    calls: Arc<AtomicUsize>,
    failures: usize,
    status: Option<u16>,
) -> impl Requestor {
    ServiceRequestor::new(tower::service_fn(move |config: RequestConfig| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n >= failures {
                return Ok(Response::ok(json!({"call": n + 1}), config));
            }
            Err(match status {
                Some(status) => status_error(status, config),
                None => RequestError::network(format!("connection reset on call {}", n + 1)),
            })
        }
    }))
}

/// A server error response for `config`.
pub fn status_error(status: u16, config: RequestConfig) -> RequestError {
    RequestError::status(Response::new(status, "error", Value::Null, config))
}

/// Holds every call until a permit is released through the returned
/// semaphore. Records the url of each call in dispatch order.
pub fn gated_transport(
    dispatched: Arc<std::sync::Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
) -> (impl Requestor, Arc<Semaphore>) {
    let gate = Arc::new(Semaphore::new(0));
    let g = Arc::clone(&gate);
    let transport = ServiceRequestor::new(tower::service_fn(move |config: RequestConfig| {
        dispatched.lock().unwrap().push(config.url.clone());
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        let gate = Arc::clone(&g);
        let active = Arc::clone(&active);
        async move {
            let permit = gate.acquire().await.map_err(|_| RequestError::other("gate closed"))?;
            permit.forget();
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(Response::ok(Value::Null, config))
        }
    }));
    (transport, gate)
}
