//! HTTP server lifecycle management.
//!
//! # Data Flow
//! ```text
//! Starting:      bind address → spawn serve task (axum)
//! Running:       block on shutdown subscription; join early task death
//! ShuttingDown:  log → request drain → wait, bounded by SHUTDOWN_DEADLINE
//! Stopped:       log "server exiting" → return classified outcome
//! ```
//!
//! # Design Decisions
//! - `run` never returns an error: failures are logged and classified in
//!   [`ShutdownOutcome`] so tests can assert on them without scraping logs
//! - The 5-second drain bound is enforced, not advisory: on expiry the
//!   serve task is aborted
//! - The runner logs through the process-wide logger; initialize it with
//!   [`crate::logs::init`] first

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Bound on graceful connection draining.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

/// Server options. Both fields are required; there is no default.
pub struct ServeOptions {
    /// Bind address (e.g. "0.0.0.0:8080").
    pub addr: String,

    /// Request handler for the whole server.
    pub router: Router,
}

/// How the server came to a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Drained and stopped within the deadline.
    Clean,
    /// Binding or serving failed before shutdown was requested.
    ServeError,
    /// The drain itself reported an error.
    ShutdownError,
    /// Draining outlived the deadline and the serve task was aborted.
    DeadlineExceeded,
}

/// Serve until a termination signal arrives, then drain within the
/// shutdown deadline.
///
/// Blocks the calling task for the lifetime of the server. Never returns
/// an error; every failure is logged and folded into the outcome.
pub async fn run(options: ServeOptions) -> ShutdownOutcome {
    let shutdown = Shutdown::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        signals::terminated().await;
        on_signal.trigger();
    });
    run_with(options, shutdown).await
}

/// Serve until `shutdown` fires.
///
/// Split out from [`run`] so tests can drive the lifecycle without raising
/// process signals.
pub async fn run_with(options: ServeOptions, shutdown: Shutdown) -> ShutdownOutcome {
    let mut requested = shutdown.subscribe();

    let listener = match TcpListener::bind(&options.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %options.addr, error = %e, "unable to bind server address");
            tracing::info!("server exiting");
            return ShutdownOutcome::ServeError;
        }
    };
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "server listening");
    }

    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let mut serve_task = tokio::spawn(
        axum::serve(listener, options.router)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        _ = requested.recv() => {}
        joined = &mut serve_task => {
            match joined {
                Ok(Err(e)) => tracing::error!(error = %e, "server failed"),
                Err(e) => tracing::error!(error = %e, "serve task panicked"),
                Ok(Ok(())) => tracing::error!("server stopped before shutdown was requested"),
            }
            tracing::info!("server exiting");
            return ShutdownOutcome::ServeError;
        }
    }

    tracing::info!("shutting down server");
    let _ = drain_tx.send(());

    let outcome = match tokio::time::timeout(SHUTDOWN_DEADLINE, &mut serve_task).await {
        Ok(Ok(Ok(()))) => ShutdownOutcome::Clean,
        Ok(Ok(Err(e))) => {
            tracing::error!(error = %e, "graceful shutdown failed");
            ShutdownOutcome::ShutdownError
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "serve task panicked during shutdown");
            ShutdownOutcome::ShutdownError
        }
        Err(_) => {
            serve_task.abort();
            tracing::error!(deadline = ?SHUTDOWN_DEADLINE, "graceful shutdown deadline exceeded");
            ShutdownOutcome::DeadlineExceeded
        }
    };

    tracing::info!("server exiting");
    outcome
}
