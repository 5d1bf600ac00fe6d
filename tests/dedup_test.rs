//! Tests for in-flight de-duplication of concurrent GETs.

mod common;

use std::time::Duration;

use godpanel::types::RequestDescriptor;
use godpanel::{CacheConfig, ErrorKind};
use serde_json::{Value, json};

use common::{Harness, MockTransport, ok};

const LATENCY: Duration = Duration::from_millis(100);

fn slow_ok(body: Value) -> MockTransport {
    MockTransport::ok(body).with_latency(LATENCY)
}

#[tokio::test(start_paused = true)]
async fn concurrent_identical_gets_share_one_dispatch() {
    let h = Harness::new(slow_ok(json!({"totalUsers": 7})));

    let (a, b, c) = tokio::join!(
        h.client.get::<Value>("/dashboard/stats"),
        h.client.get::<Value>("/dashboard/stats"),
        h.client.get::<Value>("/dashboard/stats"),
    );

    assert_eq!(h.transport.calls(), 1);
    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(a.data, Some(json!({"totalUsers": 7})));
}

#[tokio::test(start_paused = true)]
async fn different_params_are_not_merged() {
    let h = Harness::new(slow_ok(json!([])));

    let (a, b) = tokio::join!(
        h.client.request(RequestDescriptor::get("/users").param("page", 1)),
        h.client.request(RequestDescriptor::get("/users").param("page", 2)),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(h.transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn mutations_are_never_merged() {
    let h = Harness::new(slow_ok(json!({"id": "1"})));

    let body = json!({"displayName": "Ada"});
    let (a, b) = tokio::join!(
        h.client.post::<Value>("/users", &body),
        h.client.post::<Value>("/users", &body),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(h.transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn joined_callers_share_the_failure() {
    let h = Harness::without_retries(
        MockTransport::status(404, json!({"message": "no such user"})).with_latency(LATENCY),
    );

    let (a, b) = tokio::join!(
        h.client.get::<Value>("/users/9"),
        h.client.get::<Value>("/users/9"),
    );

    assert_eq!(h.transport.calls(), 1);
    for result in [a, b] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert_eq!(err.api().unwrap().message(), "no such user");
    }
}

#[tokio::test(start_paused = true)]
async fn registry_is_empty_once_settled() {
    let h = Harness::with(slow_ok(json!({})), |b| b.cache(CacheConfig::disabled()));

    let client = h.client.clone();
    let task = tokio::spawn(async move { client.get::<Value>("/dashboard/realtime").await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.client.pending_requests(), 1);

    task.await.unwrap().unwrap();
    assert_eq!(h.client.pending_requests(), 0);

    // A later identical call starts over instead of reusing the old result.
    h.client.get::<Value>("/dashboard/realtime").await.unwrap();
    assert_eq!(h.transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn late_joiner_shares_running_dispatch() {
    let h = Harness::new(slow_ok(json!({"n": 1})));

    let client = h.client.clone();
    let first = tokio::spawn(async move { client.get::<Value>("/dashboard/alerts").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = h.client.get::<Value>("/dashboard/alerts").await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(h.transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_dispatch_is_forgotten() {
    let h = Harness::new(slow_ok(json!({})));

    let client = h.client.clone();
    let task = tokio::spawn(async move { client.get::<Value>("/groups").await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.client.pending_requests(), 1);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert_eq!(h.client.pending_requests(), 0);
    assert!(h.client.cache().is_empty());
}

// =========================================================================
// Invalidation while a read is in flight
// =========================================================================

#[tokio::test(start_paused = true)]
async fn read_after_invalidation_does_not_join_older_dispatch() {
    let h = Harness::new(
        MockTransport::scripted(vec![ok(json!(["before"])), ok(json!(["after"]))])
            .with_latency(LATENCY),
    );

    let client = h.client.clone();
    let older = tokio::spawn(async move { client.get::<Value>("/users").await });
    tokio::time::sleep(LATENCY / 2).await;

    h.client.invalidate_resource("/users");
    let fresh = h.client.get::<Value>("/users").await.unwrap();
    assert_eq!(fresh.data, Some(json!(["after"])));
    assert_eq!(h.transport.calls(), 2);

    let older = older.await.unwrap().unwrap();
    assert_eq!(older.data, Some(json!(["before"])));

    // Only the read issued after the invalidation was stored.
    let cached = h.client.get::<Value>("/users").await.unwrap();
    assert_eq!(cached.data, Some(json!(["after"])));
    assert_eq!(h.transport.calls(), 2);
    assert_eq!(h.client.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn read_in_flight_during_clear_is_not_stored() {
    let h = Harness::new(slow_ok(json!({"totalUsers": 1})));

    let client = h.client.clone();
    let task = tokio::spawn(async move { client.get::<Value>("/dashboard/stats").await });
    tokio::time::sleep(LATENCY / 2).await;

    h.client.clear_cache();
    task.await.unwrap().unwrap();
    assert!(h.client.cache().is_empty());

    h.client.get::<Value>("/dashboard/stats").await.unwrap();
    assert_eq!(h.transport.calls(), 2);
    assert_eq!(h.client.cache().len(), 1);
}
