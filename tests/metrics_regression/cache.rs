//! Cache metrics regression tests

use super::helpers::*;
use crate::support::echo_transport;
use requestor_cache::CacheLayer;
use requestor_core::{RequestOptions, RequestorExt};
use serial_test::serial;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tower::Layer;

#[tokio::test]
#[serial]
async fn cache_metrics_exist() {
    init_recorder();

    let cached = CacheLayer::builder()
        .name("test_cache")
        .build()
        .layer(echo_transport(Arc::new(AtomicUsize::new(0))));

    cached.get("/users", RequestOptions::new()).await.unwrap();
    cached.get("/users", RequestOptions::new()).await.unwrap();
    cached.get("/users", RequestOptions::new()).await.unwrap();

    assert_counter_exists("cache_requests_total");
    assert_metric_has_labels("cache_requests_total", &[("cache", "test_cache"), ("result", "hit")]);
    assert_metric_has_labels("cache_requests_total", &[("cache", "test_cache"), ("result", "miss")]);
    assert_counter_exists("cache_stores_total");
    assert_metric_has_labels("cache_stores_total", &[("cache", "test_cache")]);

    assert_eq!(
        counter_value("cache_requests_total", &[("cache", "test_cache"), ("result", "hit")]),
        Some(2)
    );
    assert_eq!(
        counter_value("cache_stores_total", &[("cache", "test_cache")]),
        Some(1)
    );
}
