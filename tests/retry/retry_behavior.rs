use crate::support::flaky_transport;
use requestor_core::{RequestOptions, RequestorExt};
use requestor_retry::RetryConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

fn retry(max_count: usize) -> requestor_retry::RetryLayer {
    RetryConfig::builder()
        .max_count(max_count)
        .delay(Duration::from_millis(100))
        .build()
        .layer()
}

#[tokio::test(start_paused = true)]
async fn persistent_503_is_tried_four_times() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = retry(3).layer(flaky_transport(Arc::clone(&calls), usize::MAX, Some(503)));

    let err = requestor.get("/users", RequestOptions::new()).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test(start_paused = true)]
async fn last_error_is_returned_unchanged() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = retry(2).layer(flaky_transport(Arc::clone(&calls), usize::MAX, None));

    let err = requestor.get("/users", RequestOptions::new()).await.unwrap_err();
    assert!(err.is_network());
    assert!(err.response().is_none());
    assert_eq!(err.to_string(), "network error: connection reset on call 3");
}

#[tokio::test(start_paused = true)]
async fn not_found_is_not_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = retry(3).layer(flaky_transport(Arc::clone(&calls), usize::MAX, Some(404)));

    let err = requestor.get("/users", RequestOptions::new()).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test(start_paused = true)]
async fn network_errors_are_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = retry(3).layer(flaky_transport(Arc::clone(&calls), 2, None));

    let response = requestor.get("/users", RequestOptions::new()).await.unwrap();
    assert_eq!(response.data["call"], 3);
}

#[tokio::test(start_paused = true)]
async fn custom_predicate_replaces_the_default() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = RetryConfig::builder()
        .delay(Duration::from_millis(1))
        .should_retry(|error, _| error.status_code() == Some(429))
        .build()
        .layer()
        .layer(flaky_transport(Arc::clone(&calls), 1, Some(429)));

    requestor.get("/users", RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = RetryConfig::builder()
        .should_retry(|error, _| error.status_code() == Some(429))
        .build()
        .layer()
        .layer(flaky_transport(Arc::clone(&calls), 1, Some(503)));

    requestor.get("/users", RequestOptions::new()).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn every_retry_sends_the_same_request() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let transport = requestor_core::ServiceRequestor::new(tower::service_fn(
        move |config: requestor_core::RequestConfig| {
            s.lock().unwrap().push(config.clone());
            async move { Err::<requestor_core::Response, _>(crate::support::status_error(502, config)) }
        },
    ));

    let requestor = retry(2).layer(transport);
    requestor
        .post(
            "/orders",
            Some(serde_json::json!({"sku": 1})),
            RequestOptions::new().header("x-id", "7"),
        )
        .await
        .unwrap_err();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|config| config.body == seen[0].body
        && config.headers == seen[0].headers
        && config.url == "/orders"));
}
