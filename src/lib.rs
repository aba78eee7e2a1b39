//! Application bootstrap library: structured logging with optional remote
//! indexing, HTTP server lifecycle with graceful shutdown, and crash
//! reporting.
//!
//! Initialize the logger first; the server runner and the crash reporter
//! both log through it:
//!
//! ```rust,ignore
//! use web_bootstrap::{logs, serving, tracking};
//!
//! #[tokio::main]
//! async fn main() {
//!     logs::init(logs::LoggerBuilder::new().app_host("billing-api"));
//!     tracking::init(tracking::TrackingOptions {
//!         dsn: "https://key@sentry.example.com/42".into(),
//!     })
//!     .ok();
//!
//!     serving::run(serving::ServeOptions {
//!         addr: "0.0.0.0:8080".into(),
//!         router: axum::Router::new(),
//!     })
//!     .await;
//! }
//! ```

pub mod logs;
pub mod serving;
pub mod tracking;

pub use logs::{Health, Logger, LoggerBuilder};
pub use serving::{ServeOptions, Shutdown, ShutdownOutcome};
pub use tracking::{TrackingOptions, TrackingStatus};
