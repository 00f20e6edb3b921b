//! Concurrency and shutdown behaviour of the accept loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use route_dispatch::http::{Reply, Request};
use route_dispatch::routing::{HandlerError, RouteManifest};

mod common;

use common::{client, start_server, test_config};

async fn fetch(url: String) -> String {
    client().get(url).send().await.unwrap().text().await.unwrap()
}

/// A route that blocks until `gate` is notified, plus a fast route.
fn gated_manifest(gate: Arc<Notify>, started: Arc<Notify>) -> RouteManifest {
    RouteManifest::new()
        .get("/slow", move |_req: Request, _wild: Vec<String>| {
            let gate = Arc::clone(&gate);
            let started = Arc::clone(&started);
            async move {
                started.notify_one();
                gate.notified().await;
                Ok::<_, HandlerError>(Reply::json(200, "slow"))
            }
        })
        .get("/fast", |_req: Request, _wild: Vec<String>| async move {
            Ok::<_, HandlerError>(Reply::json(200, "fast"))
        })
}

#[tokio::test]
async fn slow_handler_does_not_block_other_requests() {
    let gate = Arc::new(Notify::new());
    let started = Arc::new(Notify::new());
    let manifest = gated_manifest(gate.clone(), started.clone());
    let server = start_server(&manifest, test_config()).await;

    let slow_url = server.url("/slow");
    let slow = tokio::spawn(fetch(slow_url));
    tokio::time::timeout(Duration::from_secs(2), started.notified())
        .await
        .expect("slow handler never started");

    let fast = tokio::time::timeout(
        Duration::from_secs(2),
        client().get(server.url("/fast")).send(),
    )
    .await
    .expect("fast request was blocked by the slow handler")
    .unwrap();
    assert_eq!(fast.text().await.unwrap(), "\nfast");
    assert!(!slow.is_finished());

    gate.notify_one();
    assert_eq!(slow.await.unwrap(), "\nslow");

    server.shutdown.trigger();
}

#[tokio::test]
async fn concurrent_requests_all_complete() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let manifest = RouteManifest::new().get("/item/%", move |_req: Request, wild: Vec<String>| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, HandlerError>(Reply::json(200, wild[0].clone()))
        }
    });
    let server = start_server(&manifest, test_config()).await;

    let client = client();
    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let client = client.clone();
            let url = server.url(&format!("/item/{i}"));
            tokio::spawn(async move { client.get(url).send().await.unwrap().text().await.unwrap() })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), format!("\n{i}"));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 50);

    server.shutdown.trigger();
}

#[tokio::test]
async fn shutdown_stops_accepting_but_lets_in_flight_finish() {
    let gate = Arc::new(Notify::new());
    let started = Arc::new(Notify::new());
    let manifest = gated_manifest(gate.clone(), started.clone());
    let server = start_server(&manifest, test_config()).await;
    let addr = server.addr;

    let slow_url = server.url("/slow");
    let slow = tokio::spawn(fetch(slow_url));
    tokio::time::timeout(Duration::from_secs(2), started.notified())
        .await
        .expect("slow handler never started");

    server.shutdown.trigger();
    let stopped = tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .expect("accept loop did not stop")
        .unwrap();
    assert!(stopped.is_ok());

    // Listener is gone.
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());

    // The in-flight request still completes.
    gate.notify_one();
    let body = tokio::time::timeout(Duration::from_secs(2), slow)
        .await
        .expect("in-flight request was dropped")
        .unwrap();
    assert_eq!(body, "\nslow");
}

#[tokio::test]
async fn drain_deadline_waits_for_in_flight_requests() {
    let gate = Arc::new(Notify::new());
    let started = Arc::new(Notify::new());
    let mut config = test_config();
    config.server.drain_timeout_secs = Some(5);
    let manifest = gated_manifest(gate.clone(), started.clone());
    let server = start_server(&manifest, config).await;

    let slow_url = server.url("/slow");
    let slow = tokio::spawn(fetch(slow_url));
    tokio::time::timeout(Duration::from_secs(2), started.notified())
        .await
        .expect("slow handler never started");

    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!server.handle.is_finished(), "run returned before draining");

    gate.notify_one();
    tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .expect("drain never finished")
        .unwrap()
        .unwrap();
    assert_eq!(slow.await.unwrap(), "\nslow");
}
