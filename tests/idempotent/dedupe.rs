use crate::support::{echo_transport, flaky_transport};
use requestor_core::key::fingerprint;
use requestor_core::{RequestConfig, RequestOptions, RequestorExt};
use requestor_idempotent::IdempotentLayer;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::Layer;

#[tokio::test(start_paused = true)]
async fn double_submit_reaches_the_transport_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .build()
        .layer(echo_transport(Arc::clone(&calls)));

    let body = json!({"name": "Ada", "plan": "pro"});
    let first = requestor
        .post("/signup", Some(body.clone()), RequestOptions::new())
        .await
        .unwrap();
    let second = requestor
        .post("/signup", Some(body), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.data, second.data);
}

#[tokio::test(start_paused = true)]
async fn window_is_sixty_seconds() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .build()
        .layer(echo_transport(Arc::clone(&calls)));

    requestor.post("/signup", None, RequestOptions::new()).await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    requestor.post("/signup", None, RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    requestor.post("/signup", None, RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn custom_window() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .duration(Duration::from_secs(5))
        .build()
        .layer(echo_transport(Arc::clone(&calls)));

    requestor.post("/signup", None, RequestOptions::new()).await.unwrap();
    tokio::time::advance(Duration::from_secs(6)).await;
    requestor.post("/signup", None, RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn headers_params_and_bodies_distinguish_requests() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .build()
        .layer(echo_transport(Arc::clone(&calls)));

    requestor.post("/signup", Some(json!({"a": 1})), RequestOptions::new()).await.unwrap();
    requestor.post("/signup", Some(json!({"a": 2})), RequestOptions::new()).await.unwrap();
    requestor
        .post("/signup", Some(json!({"a": 1})), RequestOptions::new().header("x-user", "1"))
        .await
        .unwrap();
    requestor
        .post("/signup", Some(json!({"a": 1})), RequestOptions::new().param("ref", "mail"))
        .await
        .unwrap();
    requestor.put("/signup", Some(json!({"a": 1})), RequestOptions::new()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn header_order_does_not_matter() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .build()
        .layer(echo_transport(Arc::clone(&calls)));

    requestor
        .post("/signup", None, RequestOptions::new().header("a", "1").header("b", "2"))
        .await
        .unwrap();
    requestor
        .post("/signup", None, RequestOptions::new().header("b", "2").header("a", "1"))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_submissions_can_be_resent() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .build()
        .layer(flaky_transport(Arc::clone(&calls), 1, Some(502)));

    requestor.post("/pay", None, RequestOptions::new()).await.unwrap_err();
    requestor.post("/pay", None, RequestOptions::new()).await.unwrap();
    requestor.post("/pay", None, RequestOptions::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn duplicate_hook_reports_the_fingerprint() {
    let keys = Arc::new(Mutex::new(Vec::new()));
    let k = Arc::clone(&keys);
    let requestor = IdempotentLayer::builder()
        .on_duplicate(move |key| k.lock().unwrap().push(key.to_string()))
        .build()
        .layer(echo_transport(Arc::new(AtomicUsize::new(0))));

    requestor.post("/signup", Some(json!(1)), RequestOptions::new()).await.unwrap();
    requestor.post("/signup", Some(json!(1)), RequestOptions::new()).await.unwrap();

    let expected = fingerprint(&RequestConfig::post("/signup").body(json!(1)));
    assert_eq!(*keys.lock().unwrap(), vec![expected]);
}

#[tokio::test(start_paused = true)]
async fn custom_key_generator() {
    let calls = Arc::new(AtomicUsize::new(0));
    let requestor = IdempotentLayer::builder()
        .gen_key(|config| {
            config
                .headers
                .get("idempotency-key")
                .cloned()
                .unwrap_or_else(|| fingerprint(config))
        })
        .build()
        .layer(echo_transport(Arc::clone(&calls)));

    let keyed = || RequestOptions::new().header("idempotency-key", "abc");
    requestor.post("/pay", Some(json!(1)), keyed()).await.unwrap();
    requestor.post("/pay", Some(json!(2)), keyed()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
