//! Shared utilities for integration testing.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Start a mock indexing backend that captures `_bulk` request bodies and
/// answers the cluster health endpoint.
pub async fn start_mock_elk() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new()
        .route(
            "/_bulk",
            post(move |body: String| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    Json(json!({ "errors": false, "items": [] }))
                }
            }),
        )
        .route(
            "/_cluster/health",
            get(|| async { Json(json!({ "status": "green" })) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, rx)
}
