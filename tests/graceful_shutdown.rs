//! Shutdown draining and durability sync.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;

mod common;

use common::{CountingStore, Reply, client, handler, start_programmable_origin, start_proxy};

#[tokio::test]
async fn test_in_flight_request_completes_then_store_syncs_once() {
    let (origin, _) = start_programmable_origin(|_| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Reply::ok(b"slow")
    })
    .await;
    let store = CountingStore::default();
    let proxy = start_proxy(handler(Arc::new(store.clone()), &[origin]), 30).await;
    let url = proxy.url("/slow.jpg");

    let in_flight = tokio::spawn(async move { client().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let addr = proxy.addr;
    proxy.stop().await;

    let res = in_flight.await.unwrap().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "slow");
    assert!(store.inner.contains("/slow.jpg"));
    assert_eq!(store.syncs(), 1);

    // The listener is gone once the server has stopped.
    let refused = client()
        .get(format!("http://{}/after.jpg", addr))
        .send()
        .await;
    assert!(refused.is_err());
}

#[tokio::test]
async fn test_idle_server_syncs_exactly_once() {
    let (origin, _) = common::start_mock_origin(Reply::ok(b"x")).await;
    let store = CountingStore::default();
    let proxy = start_proxy(handler(Arc::new(store.clone()), &[origin]), 30).await;

    let res = client().get(proxy.url("/x.png")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    proxy.stop().await;
    assert_eq!(store.syncs(), 1);
}

#[tokio::test]
async fn test_grace_period_bounds_the_drain() {
    let (origin, _) = start_programmable_origin(|_| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Reply::ok(b"too late")
    })
    .await;
    let store = CountingStore::default();
    let proxy = start_proxy(handler(Arc::new(store.clone()), &[origin]), 1).await;
    let url = proxy.url("/hung.gif");

    let _abandoned = tokio::spawn(async move { client().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    proxy.stop().await;
    let waited = started.elapsed();

    assert!(waited >= Duration::from_millis(900), "stopped after {:?}", waited);
    assert!(waited < Duration::from_secs(5), "stopped after {:?}", waited);
    assert_eq!(store.syncs(), 1);
}

#[tokio::test]
async fn test_abandoned_request_does_not_write_after_sync() {
    let (origin, seen) = start_programmable_origin(|_| async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        Reply::ok(b"late")
    })
    .await;
    let store = CountingStore::default();
    let proxy = start_proxy(handler(Arc::new(store.clone()), &[origin]), 1).await;
    let url = proxy.url("/late.png");

    let abandoned = tokio::spawn(async move { client().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    proxy.stop().await;
    assert_eq!(store.syncs(), 1);

    // The origin answers after the sync; that body must not reach the store.
    let _ = tokio::time::timeout(Duration::from_secs(3), abandoned).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(seen.count(), 1);
    assert!(!store.inner.contains("/late.png"));
}
