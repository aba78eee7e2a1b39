//! Integration tests for the server runner lifecycle.

use std::time::{Duration, Instant};

use axum::routing::get;
use axum::Router;
use web_bootstrap::logs::{self, LoggerBuilder};
use web_bootstrap::serving::{self, ServeOptions, Shutdown, ShutdownOutcome};

#[tokio::test]
async fn test_triggered_shutdown_is_clean() {
    logs::init(LoggerBuilder::new().testing());

    let shutdown = Shutdown::new();
    let options = ServeOptions {
        addr: "127.0.0.1:28391".into(),
        router: Router::new().route("/", get(|| async { "ok" })),
    };

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.trigger();
    });

    let started = Instant::now();
    let outcome = serving::run_with(options, shutdown).await;

    assert_eq!(outcome, ShutdownOutcome::Clean);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_drain_deadline_is_enforced() {
    logs::init(LoggerBuilder::new().testing());

    let addr = "127.0.0.1:28392";
    let options = ServeOptions {
        addr: addr.into(),
        router: Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "late"
            }),
        ),
    };

    let shutdown = Shutdown::new();
    let runner = tokio::spawn(serving::run_with(options, shutdown.clone()));

    // Let the server bind, then park a request on the slow handler.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let slow = tokio::spawn(reqwest::get(format!("http://{}/slow", addr)));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let started = Instant::now();
    shutdown.trigger();
    let outcome = runner.await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome, ShutdownOutcome::DeadlineExceeded);
    assert!(elapsed >= Duration::from_secs(5), "bound was not awaited: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(8), "bound was not enforced: {:?}", elapsed);

    slow.abort();
}

#[tokio::test]
async fn test_bind_failure_is_classified_as_serve_error() {
    logs::init(LoggerBuilder::new().testing());

    let addr = "127.0.0.1:28393";
    let holder = tokio::net::TcpListener::bind(addr).await.unwrap();

    let started = Instant::now();
    let outcome = serving::run_with(
        ServeOptions {
            addr: addr.into(),
            router: Router::new(),
        },
        Shutdown::new(),
    )
    .await;

    assert_eq!(outcome, ShutdownOutcome::ServeError);
    assert!(started.elapsed() < Duration::from_secs(1));
    drop(holder);
}

#[tokio::test]
async fn test_idle_server_drains_within_deadline() {
    logs::init(LoggerBuilder::new().testing());

    let addr = "127.0.0.1:28394";
    let shutdown = Shutdown::new();
    let runner = tokio::spawn(serving::run_with(
        ServeOptions {
            addr: addr.into(),
            router: Router::new().route("/", get(|| async { "ok" })),
        },
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(200)).await;

    // A completed request must not hold the drain open.
    let body = reqwest::get(format!("http://{}/", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");

    shutdown.trigger();
    let outcome = tokio::time::timeout(Duration::from_secs(6), runner)
        .await
        .expect("runner returned within the drain bound")
        .unwrap();
    assert_eq!(outcome, ShutdownOutcome::Clean);
}
