//! Structured logger bootstrap.
//!
//! # Data Flow
//! ```text
//! LoggerBuilder (named setters, applied in call order)
//!     → build() → fmt layer (stdout or discard)
//!               → elastic layer (when remote sync is enabled)
//!               → Logger { dispatch, health }
//!
//! init(builder):
//!     first caller builds and installs the dispatch as the process-wide
//!     tracing default; every later caller gets the same instance
//! ```
//!
//! # Design Decisions
//! - Building never fails: a remote sink that cannot attach leaves the
//!   logger in [`Health::Degraded`] and logging stays local
//! - Non-singleton instances are constructible for tests and scoped via
//!   `tracing::dispatcher::with_default`
//! - The singleton gate is an `OnceLock`: first call wins, later builders
//!   are dropped

pub mod elastic;
pub mod options;

use std::io;
use std::sync::OnceLock;
use std::time::Duration;

use tracing::Dispatch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::logs::options::LogOptions;

static INSTANCE: OnceLock<Logger> = OnceLock::new();

/// Outcome of building a logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    /// Fully operational; the remote sink (if requested) is attached.
    Ready,
    /// Local logging works but the remote sink could not be attached.
    Degraded(String),
}

/// A built logger instance.
pub struct Logger {
    dispatch: Dispatch,
    health: Health,
}

impl Logger {
    /// The tracing dispatcher backing this logger.
    ///
    /// Useful for scoping a non-singleton instance in tests via
    /// `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Whether the remote sink attached during construction.
    pub fn health(&self) -> &Health {
        &self.health
    }
}

/// Builder for [`Logger`] instances.
///
/// Setters apply in call order; a later setter overrides an earlier
/// conflicting one. The final configuration is inspectable through
/// [`LoggerBuilder::options`] before anything side-effecting runs.
#[derive(Debug, Clone, Default)]
pub struct LoggerBuilder {
    options: LogOptions,
    discard_output: bool,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host label stamped on every shipped record.
    pub fn app_host(mut self, host: impl Into<String>) -> Self {
        self.options.app.app_host = host.into();
        self
    }

    /// Endpoint DSN of the indexing backend.
    pub fn dsn(mut self, dsn: impl Into<String>) -> Self {
        self.options.elk.dsn = dsn.into();
        self
    }

    /// Index-name template with a single `%s` placeholder for the UTC date.
    pub fn index(mut self, template: impl Into<String>) -> Self {
        self.options.elk.index = template.into();
        self
    }

    /// Whether the remote sink is registered at all.
    pub fn remote_sync(mut self, enabled: bool) -> Self {
        self.options.elk.sync = enabled;
        self
    }

    /// Whether to discover cluster nodes at startup.
    pub fn sniff(mut self, enabled: bool) -> Self {
        self.options.elk.sniff = enabled;
        self
    }

    /// Whether to poll the cluster health endpoint.
    pub fn health(mut self, enabled: bool) -> Self {
        self.options.elk.health = enabled;
        self
    }

    /// Poll interval for the cluster health check.
    pub fn health_interval(mut self, interval: Duration) -> Self {
        self.options.elk.health_interval = interval;
        self
    }

    /// Per-request timeout for the cluster health check.
    pub fn health_timeout(mut self, timeout: Duration) -> Self {
        self.options.elk.health_timeout = timeout;
        self
    }

    /// Redirect local output to a no-op sink.
    pub fn discard_output(mut self) -> Self {
        self.discard_output = true;
        self
    }

    /// Testing mode discards local output and disables remote sync.
    pub fn testing(self) -> Self {
        self.discard_output().remote_sync(false)
    }

    /// The configuration as it stands, before any side effects run.
    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// Build the logger. Never fails.
    ///
    /// When remote sync is requested and the sink cannot be wired, the
    /// failure is logged through the logger being constructed and recorded
    /// as [`Health::Degraded`]; the returned logger still logs locally.
    pub fn build(self) -> Logger {
        let writer = if self.discard_output {
            BoxMakeWriter::new(io::sink)
        } else {
            BoxMakeWriter::new(io::stdout)
        };
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);

        let mut health = Health::Ready;
        let sink_layer = if self.options.elk.sync {
            match elastic::register(&self.options) {
                Ok(layer) => Some(layer),
                Err(e) => {
                    health = Health::Degraded(e.to_string());
                    None
                }
            }
        } else {
            None
        };

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .with(sink_layer);
        let dispatch = Dispatch::new(subscriber);

        if let Health::Degraded(reason) = &health {
            let dsn = &self.options.elk.dsn;
            tracing::dispatcher::with_default(&dispatch, || {
                tracing::error!(dsn = %dsn, error = %reason, "unable to attach remote log sink");
            });
        }

        Logger { dispatch, health }
    }
}

/// Build and install the process-wide logger exactly once.
///
/// The first call wins; builders passed by later callers are dropped.
/// Concurrent callers all return once the first construction has finished.
/// The winning dispatch becomes tracing's global default, so the `tracing`
/// macros log through it from any task or thread.
pub fn init(builder: LoggerBuilder) -> &'static Logger {
    INSTANCE.get_or_init(|| {
        let logger = builder.build();
        if tracing::dispatcher::set_global_default(logger.dispatch.clone()).is_err() {
            tracing::warn!("a global tracing subscriber was already installed");
        }
        logger
    })
}

/// The installed process-wide logger, or `None` before [`init`] has run.
pub fn global() -> Option<&'static Logger> {
    INSTANCE.get()
}
