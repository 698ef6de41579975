// crates/nakadi-mock/src/audit.rs
// ============================================================================
// Module: Mock Audit Logging
// Description: Structured audit events for registrations and submissions.
// Purpose: Emit JSON-line logs without a global logger.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as one JSON object per line. Sinks are
//! injected into the mock so that tests can capture them and deployments can
//! route them to stderr or an append-only file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::AuditConfig;
use crate::config::AuditSinkType;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Submission audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event type named in the submission path.
    pub event_type: String,
    /// Response status code.
    pub status: u16,
    /// Request outcome label (`ok` or `error`).
    pub outcome: &'static str,
    /// Number of decoded events, when decoding succeeded.
    pub batch_size: Option<usize>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
}

impl SubmissionAuditEvent {
    /// Builds a submission event stamped with the current time.
    #[must_use]
    pub fn new(
        event_type: &str,
        status: u16,
        batch_size: Option<usize>,
        request_bytes: usize,
        response_bytes: usize,
        error_kind: Option<&'static str>,
    ) -> Self {
        Self {
            event: "event_submission",
            timestamp_ms: now_ms(),
            event_type: event_type.to_string(),
            status,
            outcome: if error_kind.is_some() { "error" } else { "ok" },
            batch_size,
            request_bytes,
            response_bytes,
            error_kind,
        }
    }
}

/// Binding audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Bound event type name.
    pub event_type: String,
    /// Label of the bound element shape.
    pub element_shape: String,
}

impl BindingAuditEvent {
    /// Builds a binding event stamped with the current time.
    #[must_use]
    pub fn new(event_type: &str, element_shape: &str) -> Self {
        Self {
            event: "event_type_bound",
            timestamp_ms: now_ms(),
            event_type: event_type.to_string(),
            element_shape: element_shape.to_string(),
        }
    }
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for mock events.
pub trait MockAuditSink: Send + Sync {
    /// Record a submission event.
    fn record_submission(&self, event: &SubmissionAuditEvent);

    /// Record a binding event.
    fn record_binding(&self, _event: &BindingAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl MockAuditSink for StderrAuditSink {
    fn record_submission(&self, event: &SubmissionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }

    fn record_binding(&self, event: &BindingAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
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

    /// Appends one serialized event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl MockAuditSink for FileAuditSink {
    fn record_submission(&self, event: &SubmissionAuditEvent) {
        self.append(event);
    }

    fn record_binding(&self, event: &BindingAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl MockAuditSink for NoopAuditSink {
    fn record_submission(&self, _event: &SubmissionAuditEvent) {}
}

/// Builds the sink selected by the audit configuration.
///
/// # Errors
///
/// Returns an error when the file sink cannot be opened.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn MockAuditSink>> {
    let sink: Arc<dyn MockAuditSink> = match (config.sink, config.path.as_deref()) {
        (AuditSinkType::None, _) => Arc::new(NoopAuditSink),
        (AuditSinkType::Stderr, _) => Arc::new(StderrAuditSink),
        (AuditSinkType::File, Some(path)) => Arc::new(FileAuditSink::new(path)?),
        (AuditSinkType::File, None) => {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "audit file sink requires path"));
        }
    };
    Ok(sink)
}
