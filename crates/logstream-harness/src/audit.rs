// crates/logstream-harness/src/audit.rs
// ============================================================================
// Module: Exchange Logging
// Description: Structured JSON-line records for HTTP exchanges and violations.
// Purpose: Leave a machine-readable trail of every request a scenario issued.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every request issued through [`crate::ServiceClient`] produces an
//! [`ExchangeEvent`]; every failed assertion produces a [`ViolationEvent`].
//! Sinks decide where the JSON lines go. Request bodies and credentials are
//! never recorded, only their sizes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a single HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// A response was received (any status).
    Ok,
    /// The transport failed before a response arrived.
    TransportError,
}

/// Record of one request/response pair.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Label of the client that issued the request.
    pub client: String,
    /// Request method.
    pub method: String,
    /// Request path relative to the client base URL.
    pub path: String,
    /// Response status code when a response arrived.
    pub status: Option<u16>,
    /// Exchange outcome.
    pub outcome: ExchangeOutcome,
    /// Transport error message when the call failed.
    pub error: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the exchange.
    pub duration_ms: u128,
}

/// Inputs required to construct an exchange event.
pub struct ExchangeEventParams {
    /// Label of the client that issued the request.
    pub client: String,
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code when a response arrived.
    pub status: Option<u16>,
    /// Transport error message when the call failed.
    pub error: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock duration of the exchange.
    pub duration_ms: u128,
}

impl ExchangeEvent {
    /// Creates a new exchange event stamped with the current time.
    #[must_use]
    pub fn new(params: ExchangeEventParams) -> Self {
        let outcome =
            if params.error.is_some() { ExchangeOutcome::TransportError } else { ExchangeOutcome::Ok };
        Self {
            event: "http_exchange",
            timestamp_ms: now_millis(),
            client: params.client,
            method: params.method,
            path: params.path,
            status: params.status,
            outcome,
            error: params.error,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            duration_ms: params.duration_ms,
        }
    }
}

/// Record of a failed contract assertion.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Violation kind label (see [`crate::HarnessError::kind`]).
    pub kind: &'static str,
    /// Rendered failure message.
    pub message: String,
}

impl ViolationEvent {
    /// Creates a new violation event stamped with the current time.
    #[must_use]
    pub fn new(method: String, path: String, kind: &'static str, message: String) -> Self {
        Self {
            event: "contract_violation",
            timestamp_ms: now_millis(),
            method,
            path,
            kind,
            message,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for exchange and violation records.
pub trait ExchangeSink: Send + Sync {
    /// Record an HTTP exchange.
    fn record_exchange(&self, event: &ExchangeEvent);

    /// Record a contract violation.
    fn record_violation(&self, _event: &ViolationEvent) {}
}

/// Sink that discards every record.
pub struct NoopExchangeSink;

impl ExchangeSink for NoopExchangeSink {
    fn record_exchange(&self, _event: &ExchangeEvent) {}
}

/// Sink that writes JSON lines to stderr.
pub struct StderrExchangeSink;

impl ExchangeSink for StderrExchangeSink {
    fn record_exchange(&self, event: &ExchangeEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }

    fn record_violation(&self, event: &ViolationEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileExchangeSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileExchangeSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line.
    fn write_line<T: Serialize>(&self, event: &T) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

impl ExchangeSink for FileExchangeSink {
    fn record_exchange(&self, event: &ExchangeEvent) {
        self.write_line(event);
    }

    fn record_violation(&self, event: &ViolationEvent) {
        self.write_line(event);
    }
}

/// In-memory sink used as a per-scenario transcript.
#[derive(Default)]
pub struct MemoryExchangeSink {
    /// Captured exchanges in issue order.
    exchanges: Mutex<Vec<ExchangeEvent>>,
    /// Captured violations in issue order.
    violations: Mutex<Vec<ViolationEvent>>,
}

impl MemoryExchangeSink {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded exchanges.
    #[must_use]
    pub fn exchanges(&self) -> Vec<ExchangeEvent> {
        self.exchanges.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns a snapshot of the recorded violations.
    #[must_use]
    pub fn violations(&self) -> Vec<ViolationEvent> {
        self.violations.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl ExchangeSink for MemoryExchangeSink {
    fn record_exchange(&self, event: &ExchangeEvent) {
        if let Ok(mut guard) = self.exchanges.lock() {
            guard.push(event.clone());
        }
    }

    fn record_violation(&self, event: &ViolationEvent) {
        if let Ok(mut guard) = self.violations.lock() {
            guard.push(event.clone());
        }
    }
}

/// Fans records out to several sinks.
pub struct TeeExchangeSink {
    /// Downstream sinks, written in order.
    sinks: Vec<std::sync::Arc<dyn ExchangeSink>>,
}

impl TeeExchangeSink {
    /// Creates a sink that forwards to every entry in `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<std::sync::Arc<dyn ExchangeSink>>) -> Self {
        Self {
            sinks,
        }
    }
}

impl ExchangeSink for TeeExchangeSink {
    fn record_exchange(&self, event: &ExchangeEvent) {
        for sink in &self.sinks {
            sink.record_exchange(event);
        }
    }

    fn record_violation(&self, event: &ViolationEvent) {
        for sink in &self.sinks {
            sink.record_violation(event);
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch, saturating to zero on clock skew.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
