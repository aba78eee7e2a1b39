//! Logger option definitions.
//!
//! All types derive Serde traits so a host application can embed them in its
//! own config file. Every field has a documented default; a minimal config is
//! always valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application-level options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppOptions {
    /// Host label stamped on every shipped log record.
    pub app_host: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            app_host: "localhost".to_string(),
        }
    }
}

/// Remote sink options for an Elasticsearch-style indexing backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ElkOptions {
    /// Endpoint DSN of the indexing backend.
    pub dsn: String,

    /// Index-name template with a single `%s` placeholder.
    ///
    /// The placeholder receives the current UTC date as `YYYY.MM.DD`, so
    /// the effective index rotates at UTC midnight.
    pub index: String,

    /// Whether log records are shipped to the remote sink at all.
    pub sync: bool,

    /// Whether to discover cluster nodes at startup.
    pub sniff: bool,

    /// Whether to poll the cluster health endpoint in the background.
    pub health: bool,

    /// Poll interval for the cluster health check.
    pub health_interval: Duration,

    /// Per-request timeout for the cluster health check.
    pub health_timeout: Duration,
}

impl Default for ElkOptions {
    fn default() -> Self {
        Self {
            dsn: "http://localhost:9200".to_string(),
            index: "org.module.app.%s".to_string(),
            sync: true,
            sniff: false,
            health: true,
            health_interval: Duration::from_secs(30),
            health_timeout: Duration::from_secs(3),
        }
    }
}

/// Composed logger options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogOptions {
    /// Application identity.
    pub app: AppOptions,

    /// Remote sink settings.
    pub elk: ElkOptions,
}
