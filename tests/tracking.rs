//! Integration tests for the crash-reporter bootstrap.
//!
//! The gates under test are process-wide, so ordering matters and the
//! whole lifecycle lives in a single test function.

use web_bootstrap::logs::{self, LoggerBuilder};
use web_bootstrap::tracking::{self, TrackingError, TrackingOptions, TrackingStatus};

#[test]
fn test_tracking_lifecycle() {
    // Before the logger exists, initialization must fail fast instead of
    // logging into the void.
    let early = tracking::init(TrackingOptions {
        dsn: "https://key@sentry.example.com/42".into(),
    });
    assert!(matches!(early, Err(TrackingError::LoggerNotInitialized)));

    logs::init(LoggerBuilder::new().testing());

    let first = tracking::init(TrackingOptions {
        dsn: "https://key@sentry.example.com/42".into(),
    })
    .unwrap();
    assert_eq!(first, TrackingStatus::Enabled);

    // A second call with a different endpoint is a no-op; the first
    // endpoint stays installed.
    let second = tracking::init(TrackingOptions {
        dsn: "https://other@sentry.example.com/7".into(),
    })
    .unwrap();
    assert_eq!(second, TrackingStatus::Enabled);

    let installed = sentry::Hub::current()
        .client()
        .and_then(|client| client.dsn().cloned())
        .expect("client installed");
    assert_eq!(installed.to_string(), "https://key@sentry.example.com/42");
}
