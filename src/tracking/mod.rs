//! Crash-reporting bootstrap.
//!
//! Initializes the Sentry client exactly once per process. The gate is
//! independent of the logger's: the two subsystems are unrelated one-time
//! initializations, except that this one logs its own setup failures and
//! therefore requires the logger to exist first.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::logs;

static STATE: OnceLock<TrackingState> = OnceLock::new();

/// Crash-reporting options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingOptions {
    /// Endpoint DSN of the crash-reporting backend.
    pub dsn: String,
}

/// Outcome of crash-reporter initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    /// The client is installed and reporting.
    Enabled,
    /// The client could not be installed; the process runs without crash
    /// reporting.
    Degraded,
}

/// Misuse of the bootstrap ordering contract.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("the process-wide logger must be initialized before tracking")]
    LoggerNotInitialized,
}

struct TrackingState {
    status: TrackingStatus,
    // Keeps the Sentry client alive for the process lifetime.
    _guard: Option<sentry::ClientInitGuard>,
}

/// Initialize crash reporting exactly once.
///
/// The first call wins; the DSN of any later call is ignored. Requires
/// [`logs::init`] to have run so that initialization failures have
/// somewhere to go — calling earlier fails fast instead of logging into
/// the void.
pub fn init(options: TrackingOptions) -> Result<TrackingStatus, TrackingError> {
    if logs::global().is_none() {
        return Err(TrackingError::LoggerNotInitialized);
    }

    let state = STATE.get_or_init(|| match options.dsn.parse::<sentry::types::Dsn>() {
        Ok(dsn) => {
            let guard = sentry::init(sentry::ClientOptions {
                dsn: Some(dsn),
                ..Default::default()
            });
            TrackingState {
                status: TrackingStatus::Enabled,
                _guard: Some(guard),
            }
        }
        Err(e) => {
            tracing::error!(dsn = %options.dsn, error = %e, "unable to initialize crash reporting");
            TrackingState {
                status: TrackingStatus::Degraded,
                _guard: None,
            }
        }
    });

    Ok(state.status)
}
