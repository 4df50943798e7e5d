//! Property tests for the concurrency decorator.
//!
//! Invariants tested:
//! - Never more than max_count calls in flight
//! - Dispatch follows enqueue order
//! - Every request settles

use super::paused_runtime;
use proptest::prelude::*;
use requestor_core::{RequestConfig, RequestError, RequestOptions, RequestorExt, Response, ServiceRequestor};
use requestor_parallel::ParallelLayer;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::Layer;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Property: the cap holds and admission is first come, first served
    #[test]
    fn cap_and_order_hold(
        max_count in 1usize..=6,
        latencies in prop::collection::vec(1u64..50, 1..30),
    ) {
        paused_runtime().block_on(async {
            let active = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let order = Arc::new(Mutex::new(Vec::new()));
            let (a, p, o) = (Arc::clone(&active), Arc::clone(&peak), Arc::clone(&order));

            let transport = ServiceRequestor::new(tower::service_fn(move |config: RequestConfig| {
                o.lock().unwrap().push(config.url.clone());
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                let active = Arc::clone(&a);
                let latency = config.params.get("latency").and_then(Value::as_u64).unwrap_or(1);
                async move {
                    tokio::time::sleep(Duration::from_millis(latency)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, RequestError>(Response::ok(Value::Null, config))
                }
            }));

            let requestor = ParallelLayer::builder().max_count(max_count).build().layer(transport);
            let calls: Vec<_> = latencies
                .iter()
                .enumerate()
                .map(|(i, latency)| {
                    requestor.get(&format!("/{i}"), RequestOptions::new().param("latency", *latency))
                })
                .collect();
            let results = futures::future::join_all(calls).await;

            prop_assert!(results.iter().all(Result::is_ok));
            prop_assert!(peak.load(Ordering::SeqCst) <= max_count);
            prop_assert_eq!(peak.load(Ordering::SeqCst), max_count.min(latencies.len()));
            let expected: Vec<_> = (0..latencies.len()).map(|i| format!("/{i}")).collect();
            prop_assert_eq!(&*order.lock().unwrap(), &expected);
            prop_assert_eq!(requestor.in_flight(), 0);
            Ok(())
        })?;
    }
}
