//! Retry metrics regression tests

use super::helpers::*;
use crate::support::flaky_transport;
use requestor_core::{RequestOptions, RequestorExt};
use requestor_retry::RetryConfig;
use serial_test::serial;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

#[tokio::test]
#[serial]
async fn retry_metrics_exist() {
    init_recorder();

    let requestor = RetryConfig::builder()
        .name("test_retry")
        .max_count(3)
        .delay(Duration::from_millis(1))
        .build()
        .layer()
        .layer(flaky_transport(Arc::new(AtomicUsize::new(0)), 2, None));

    requestor.get("/users", RequestOptions::new()).await.unwrap();

    assert_counter_exists("retry_calls_total");
    assert_metric_has_labels("retry_calls_total", &[("retry", "test_retry"), ("result", "success")]);
    assert_counter_exists("retry_attempts_total");
    assert_eq!(
        counter_value("retry_attempts_total", &[("retry", "test_retry")]),
        Some(2)
    );
}

#[tokio::test]
#[serial]
async fn retry_outcome_labels() {
    init_recorder();

    let layer = |name: &str| {
        RetryConfig::builder()
            .name(name)
            .max_count(1)
            .delay(Duration::from_millis(1))
            .build()
            .layer()
    };

    let exhausted = layer("exhausted_retry")
        .layer(flaky_transport(Arc::new(AtomicUsize::new(0)), usize::MAX, Some(503)));
    exhausted.get("/users", RequestOptions::new()).await.unwrap_err();

    let ignored = layer("ignored_retry")
        .layer(flaky_transport(Arc::new(AtomicUsize::new(0)), usize::MAX, Some(404)));
    ignored.get("/users", RequestOptions::new()).await.unwrap_err();

    assert_metric_has_labels("retry_calls_total", &[("retry", "exhausted_retry"), ("result", "exhausted")]);
    assert_metric_has_labels("retry_calls_total", &[("retry", "ignored_retry"), ("result", "ignored")]);
}
