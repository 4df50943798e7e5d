//! The configured stack from the facade crate.

use crate::support::{echo_transport, flaky_transport, init_tracing};
use requestor::core::{RequestOptions, RequestorExt};
use requestor::{RequestorStack, StackConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn default_stack_retries_then_caches() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let api = RequestorStack::default().build(flaky_transport(Arc::clone(&calls), 3, Some(500)));

    let started = Instant::now();
    let response = api.get("/users", RequestOptions::new()).await.unwrap();

    // 1s + 2s + 3s of linear backoff.
    assert_eq!(started.elapsed(), Duration::from_secs(6));
    assert_eq!(response.data["call"], 4);

    api.get("/users", RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn retry_count_from_json() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let config = StackConfig::from_json(r#"{"retryCount": 1, "retryDelayMs": 5}"#).unwrap();
    let api = RequestorStack::new(config).build(flaky_transport(Arc::clone(&calls), usize::MAX, None));

    api.get("/users", RequestOptions::new()).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cache_duration_from_json() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = StackConfig::from_json(r#"{"cacheDurationMs": 1000}"#).unwrap();
    let api = RequestorStack::new(config).build(echo_transport(Arc::clone(&calls)));

    api.get("/users", RequestOptions::new()).await.unwrap();
    tokio::time::advance(Duration::from_millis(1500)).await;
    api.get("/users", RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn unknown_fields_are_ignored() {
    let config = StackConfig::from_json(r#"{"theme": "dark", "maxParallel": 1}"#).unwrap();
    assert_eq!(config.max_parallel, 1);
    assert!(config.enable_cache);
}
