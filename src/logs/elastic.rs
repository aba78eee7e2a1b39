//! Remote log sink for an Elasticsearch-style indexing backend.
//!
//! The sink is a [`tracing_subscriber::Layer`] that serializes every event at
//! DEBUG severity or above and hands it to a background shipper task over a
//! bounded queue. The shipper batches records and POSTs them to the `_bulk`
//! endpoint. Everything here is best effort: a full queue drops the record,
//! a failed shipment is logged and forgotten, and no retries are performed.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;
use url::Url;

use crate::logs::options::LogOptions;

/// Records buffered before a bulk flush is forced.
const MAX_BATCH: usize = 512;

/// Interval between time-triggered flushes.
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Queue capacity between the layer and the shipper task.
const QUEUE_CAPACITY: usize = 2048;

/// Timeout applied to each bulk shipment request.
const SHIP_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while wiring the remote sink.
#[derive(Debug, thiserror::Error)]
pub enum ElasticError {
    #[error("invalid dsn: {0}")]
    InvalidDsn(#[from] url::ParseError),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("no tokio runtime available for the shipper task")]
    NoRuntime,
}

/// Compute the concrete index name for the given UTC instant.
///
/// The template's single `%s` placeholder receives the `YYYY.MM.DD` date,
/// so the effective index rolls over at UTC midnight regardless of the
/// local time zone.
pub fn index_name(template: &str, at: DateTime<Utc>) -> String {
    template.replacen("%s", &at.format("%Y.%m.%d").to_string(), 1)
}

/// A single record queued for bulk shipment.
struct LogRecord {
    index: String,
    doc: Value,
}

/// Tracing layer forwarding qualifying events to the bulk shipper.
pub struct ElasticLayer {
    tx: mpsc::Sender<LogRecord>,
    host: String,
    index_template: String,
}

/// Build the remote sink layer and spawn its background tasks.
///
/// Requires a current tokio runtime; the shipper, health poller, and node
/// discovery all run as spawned tasks on it.
pub fn register(options: &LogOptions) -> Result<ElasticLayer, ElasticError> {
    let endpoint = Url::parse(&options.elk.dsn)?;
    let client = Client::builder().build()?;
    let handle = tokio::runtime::Handle::try_current().map_err(|_| ElasticError::NoRuntime)?;

    if options.elk.sniff {
        handle.spawn(sniff_nodes(client.clone(), endpoint.clone()));
    }
    if options.elk.health {
        handle.spawn(poll_health(
            client.clone(),
            endpoint.clone(),
            options.elk.health_interval,
            options.elk.health_timeout,
        ));
    }

    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    handle.spawn(ship(client, endpoint, rx));

    Ok(ElasticLayer {
        tx,
        host: options.app.app_host.clone(),
        index_template: options.elk.index.clone(),
    })
}

impl<S: Subscriber> Layer<S> for ElasticLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // Ship everything at DEBUG severity or above; only TRACE is skipped.
        if *meta.level() > Level::DEBUG {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let doc = json!({
            "@timestamp": Utc::now().to_rfc3339(),
            "level": meta.level().to_string(),
            "target": meta.target(),
            "host": self.host,
            "message": visitor.message,
            "fields": Value::Object(visitor.fields),
        });
        let record = LogRecord {
            index: index_name(&self.index_template, Utc::now()),
            doc,
        };

        // Best effort: a full queue drops the record rather than blocking
        // the emitting call site.
        let _ = self.tx.try_send(record);
    }
}

/// Collects event fields into a JSON object, special-casing `message`.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: serde_json::Map<String, Value>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), Value::from(format!("{:?}", value)));
        }
    }
}

/// Receive records and flush them in batches, either when the batch fills
/// or on the flush interval.
async fn ship(client: Client, endpoint: Url, mut rx: mpsc::Receiver<LogRecord>) {
    let mut batch: Vec<LogRecord> = Vec::new();
    let mut tick = tokio::time::interval(FLUSH_INTERVAL);

    loop {
        tokio::select! {
            record = rx.recv() => match record {
                Some(record) => {
                    batch.push(record);
                    if batch.len() >= MAX_BATCH {
                        flush(&client, &endpoint, &mut batch).await;
                    }
                }
                None => {
                    flush(&client, &endpoint, &mut batch).await;
                    break;
                }
            },
            _ = tick.tick() => flush(&client, &endpoint, &mut batch).await,
        }
    }
}

async fn flush(client: &Client, endpoint: &Url, batch: &mut Vec<LogRecord>) {
    if batch.is_empty() {
        return;
    }

    let mut body = String::new();
    for record in batch.drain(..) {
        body.push_str(&json!({ "index": { "_index": record.index } }).to_string());
        body.push('\n');
        body.push_str(&record.doc.to_string());
        body.push('\n');
    }

    let url = match endpoint.join("_bulk") {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "bulk endpoint url is unusable");
            return;
        }
    };

    match client
        .post(url)
        .header("content-type", "application/x-ndjson")
        .body(body)
        .timeout(SHIP_TIMEOUT)
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {}
        Ok(resp) => tracing::warn!(status = %resp.status(), "bulk log shipment rejected"),
        Err(e) => tracing::warn!(error = %e, "bulk log shipment failed"),
    }
}

/// One-shot node discovery. Informational only; shipment stays on the
/// configured DSN.
async fn sniff_nodes(client: Client, endpoint: Url) {
    let Ok(url) = endpoint.join("_nodes/http") else {
        return;
    };
    match client.get(url).send().await.and_then(|r| r.error_for_status()) {
        Ok(resp) => match resp.json::<Value>().await {
            Ok(body) => {
                let nodes = body
                    .get("nodes")
                    .and_then(Value::as_object)
                    .map_or(0, |nodes| nodes.len());
                tracing::debug!(nodes, "discovered cluster nodes");
            }
            Err(e) => tracing::warn!(error = %e, "cluster discovery returned an unreadable body"),
        },
        Err(e) => tracing::warn!(error = %e, "cluster discovery failed"),
    }
}

/// Poll the cluster health endpoint, logging failures.
async fn poll_health(client: Client, endpoint: Url, interval: Duration, timeout: Duration) {
    let Ok(url) = endpoint.join("_cluster/health") else {
        return;
    };
    let mut tick = tokio::time::interval(interval);
    loop {
        tick.tick().await;
        match client.get(url.clone()).timeout(timeout).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => tracing::warn!(status = %resp.status(), "cluster health check failed"),
            Err(e) => tracing::warn!(error = %e, "cluster health check unreachable"),
        }
    }
}
