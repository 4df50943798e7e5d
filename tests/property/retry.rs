//! Property tests for the retry decorator.
//!
//! Invariants tested:
//! - Retryable failures are tried exactly max_count + 1 times
//! - A success stops retrying
//! - Non-retryable statuses are tried once
//! - Waits follow the linear schedule

use super::paused_runtime;
use crate::support::flaky_transport;
use proptest::prelude::*;
use requestor_core::{RequestOptions, RequestorExt};
use requestor_retry::RetryConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower::Layer;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: a persistent 5xx is tried exactly max_count + 1 times
    #[test]
    fn retry_respects_max_count(
        max_count in 0usize..=8,
        status in 500u16..600,
    ) {
        paused_runtime().block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let requestor = RetryConfig::builder()
                .max_count(max_count)
                .delay(Duration::from_millis(1))
                .build()
                .layer()
                .layer(flaky_transport(Arc::clone(&calls), usize::MAX, Some(status)));

            let err = requestor.get("/p", RequestOptions::new()).await.unwrap_err();
            prop_assert_eq!(err.status_code(), Some(status));
            prop_assert_eq!(calls.load(Ordering::SeqCst), max_count + 1);
            Ok(())
        })?;
    }

    /// Property: success on the n-th attempt stops retrying
    #[test]
    fn retry_stops_on_success(
        max_count in 1usize..=8,
        failures in 0usize..=8,
    ) {
        prop_assume!(failures <= max_count);

        paused_runtime().block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let requestor = RetryConfig::builder()
                .max_count(max_count)
                .delay(Duration::from_millis(1))
                .build()
                .layer()
                .layer(flaky_transport(Arc::clone(&calls), failures, None));

            let response = requestor.get("/p", RequestOptions::new()).await;
            prop_assert!(response.is_ok());
            prop_assert_eq!(calls.load(Ordering::SeqCst), failures + 1);
            Ok(())
        })?;
    }

    /// Property: statuses outside 5xx are never retried by default
    #[test]
    fn client_errors_are_tried_once(status in 400u16..500) {
        paused_runtime().block_on(async {
            let calls = Arc::new(AtomicUsize::new(0));
            let requestor = RetryConfig::builder()
                .build()
                .layer()
                .layer(flaky_transport(Arc::clone(&calls), usize::MAX, Some(status)));

            requestor.get("/p", RequestOptions::new()).await.unwrap_err();
            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            Ok(())
        })?;
    }

    /// Property: total wait is delay * (1 + 2 + ... + max_count)
    #[test]
    fn linear_schedule(
        max_count in 0usize..=6,
        delay_ms in 1u64..=500,
    ) {
        paused_runtime().block_on(async {
            let requestor = RetryConfig::builder()
                .max_count(max_count)
                .delay(Duration::from_millis(delay_ms))
                .build()
                .layer()
                .layer(flaky_transport(Arc::new(AtomicUsize::new(0)), usize::MAX, None));

            let started = Instant::now();
            requestor.get("/p", RequestOptions::new()).await.unwrap_err();

            let n = max_count as u64;
            let expected = Duration::from_millis(delay_ms * n * (n + 1) / 2);
            prop_assert_eq!(started.elapsed(), expected);
            Ok(())
        })?;
    }
}
