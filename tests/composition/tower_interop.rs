//! Stacks exposed back to tower.

use crate::support::echo_transport;
use requestor_cache::CacheLayer;
use requestor_core::{RequestConfig, RequestorService};
use requestor_retry::RetryConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::{Layer, Service, ServiceExt};

#[tokio::test]
async fn stack_as_a_tower_service() {
    let calls = Arc::new(AtomicUsize::new(0));
    let stack = RetryConfig::builder()
        .build()
        .layer()
        .layer(CacheLayer::builder().build().layer(echo_transport(Arc::clone(&calls))));

    let mut service = RequestorService::new(Arc::new(stack));
    for _ in 0..3 {
        let response = service
            .ready()
            .await
            .unwrap()
            .call(RequestConfig::get("/users"))
            .await
            .unwrap();
        assert_eq!(response.data["url"], "/users");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn service_clones_share_the_stack() {
    let calls = Arc::new(AtomicUsize::new(0));
    let stack = CacheLayer::builder().build().layer(echo_transport(Arc::clone(&calls)));
    let service = RequestorService::new(Arc::new(stack));

    service.clone().oneshot(RequestConfig::get("/users")).await.unwrap();
    service.oneshot(RequestConfig::get("/users")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
