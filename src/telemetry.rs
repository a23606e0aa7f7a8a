//! Usage telemetry.
//!
//! Submission never blocks the caller and never fails it: sink errors are
//! logged at debug level and dropped. Before the process exits,
//! [`Telemetry::flush`] waits a bounded time for delivery to finish.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{Result, TinaError};

pub const AUDIT_INVOKE_EVENT: &str = "tinacms:cli:audit:invoke";

const DEFAULT_ENDPOINT: &str = "https://telemetry.tinajs.io/api/events";
const ENDPOINT_ENV: &str = "TINA_TELEMETRY_ENDPOINT";
const DISABLED_ENVS: [&str; 2] = ["TINA_TELEMETRY_DISABLED", "DO_NOT_TRACK"];
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Longest [`Telemetry::flush`] waits for outstanding deliveries.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(REQUEST_TIMEOUT_SECS);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryEvent {
    pub name: String,
    pub clean: bool,
    #[serde(rename = "useDefaults")]
    pub use_defaults: bool,
}

impl TelemetryEvent {
    #[must_use]
    pub fn audit_invoked(clean: bool, use_defaults: bool) -> Self {
        Self {
            name: AUDIT_INVOKE_EVENT.to_string(),
            clean,
            use_defaults,
        }
    }
}

/// Envelope posted to the telemetry endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryRecord {
    pub event: TelemetryEvent,
}

/// Destination for telemetry records.
pub trait TelemetrySink {
    /// Hand off a record for delivery.
    ///
    /// # Errors
    /// Returns an error if the record could not be handed off.
    fn send(&self, record: &TelemetryRecord) -> Result<()>;

    /// Wait up to `limit` for handed-off records to be delivered.
    fn flush(&self, _limit: Duration) {}
}

/// Background jobs that can be waited for with a deadline.
#[derive(Debug, Default)]
pub struct Deliveries {
    pending: Mutex<Vec<Receiver<()>>>,
}

impl Deliveries {
    /// Run `job` on a new thread and track its completion.
    ///
    /// # Errors
    /// Returns [`TinaError::Telemetry`] if the thread cannot be spawned.
    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        let (done, finished) = mpsc::channel();
        thread::Builder::new()
            .name("telemetry".to_string())
            .spawn(move || {
                job();
                let _ = done.send(());
            })
            .map_err(|e| TinaError::Telemetry(format!("failed to spawn sender: {e}")))?;
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(finished);
        Ok(())
    }

    /// Wait for every tracked job, sharing one `limit` between them.
    ///
    /// Jobs still running at the deadline are abandoned.
    pub fn wait(&self, limit: Duration) {
        let deadline = Instant::now() + limit;
        let pending =
            std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        for finished in pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if finished.recv_timeout(remaining).is_err() {
                tracing::debug!("telemetry delivery abandoned");
            }
        }
    }
}

/// Posts records with reqwest on a background thread.
///
/// Delivery needs a real HTTP server, so it is excluded from coverage
/// measurement.
#[derive(Debug)]
pub struct HttpSink {
    endpoint: String,
    deliveries: Deliveries,
}

impl HttpSink {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            deliveries: Deliveries::default(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()))
    }
}

#[cfg(not(tarpaulin_include))]
impl TelemetrySink for HttpSink {
    fn send(&self, record: &TelemetryRecord) -> Result<()> {
        let body = serde_json::to_value(record)?;
        let endpoint = self.endpoint.clone();
        self.deliveries.spawn(move || {
            let client = match reqwest::blocking::Client::builder()
                .timeout(FLUSH_TIMEOUT)
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    tracing::debug!(error = %e, "telemetry client unavailable");
                    return;
                }
            };
            match client.post(&endpoint).json(&body).send() {
                Ok(response) if !response.status().is_success() => {
                    tracing::debug!(status = %response.status(), "telemetry rejected");
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "telemetry not delivered"),
            }
        })
    }

    fn flush(&self, limit: Duration) {
        self.deliveries.wait(limit);
    }
}

pub struct Telemetry {
    disabled: bool,
    sink: Box<dyn TelemetrySink>,
}

impl Telemetry {
    #[must_use]
    pub fn new(disabled: bool, sink: Box<dyn TelemetrySink>) -> Self {
        Self { disabled, sink }
    }

    /// HTTP telemetry, disabled by `no_telemetry` or by the environment.
    #[must_use]
    pub fn from_env(no_telemetry: bool) -> Self {
        let env_disabled = DISABLED_ENVS
            .iter()
            .any(|name| std::env::var(name).is_ok_and(|v| is_truthy(&v)));
        Self::new(no_telemetry || env_disabled, Box::new(HttpSink::from_env()))
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Submit `event` without waiting for delivery. Failures are swallowed.
    pub fn submit_record(&self, event: TelemetryEvent) {
        if self.disabled {
            return;
        }
        let record = TelemetryRecord { event };
        if let Err(e) = self.sink.send(&record) {
            tracing::debug!(error = %e, "telemetry submission failed");
        }
    }

    /// Wait, at most [`FLUSH_TIMEOUT`], for submitted records to be delivered.
    pub fn flush(&self) {
        if !self.disabled {
            self.sink.flush(FLUSH_TIMEOUT);
        }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no")
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
