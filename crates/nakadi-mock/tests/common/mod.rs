// crates/nakadi-mock/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared HTTP helpers and event fixtures for mock tests.
// Purpose: Keep request plumbing out of the behavioural tests.
// Dependencies: nakadi-mock, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Provides a started mock, a blocking POST helper, and a small business
//! event type used across the integration tests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use nakadi_mock::BindingAuditEvent;
use nakadi_mock::MockAuditSink;
use nakadi_mock::NakadiMock;
use nakadi_mock::SubmissionAuditEvent;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Business event used by typed handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    /// Order identifier.
    pub order_id: String,
    /// Ordered quantity.
    pub quantity: u32,
}

/// Builds a JSON order event with the given identifier.
pub fn order_json(order_id: &str, quantity: u32) -> Value {
    json!({ "order_id": order_id, "quantity": quantity })
}

/// Returns a started mock with default configuration.
pub fn started_mock() -> NakadiMock {
    let mut mock = NakadiMock::new();
    mock.start().unwrap();
    mock
}

// ============================================================================
// SECTION: HTTP
// ============================================================================

/// Response captured from the mock.
#[derive(Debug)]
pub struct Captured {
    /// Status code.
    pub status: u16,
    /// Content type header, if present.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Captured {
    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Posts a raw body to the submission endpoint of `event_type`.
pub fn post_raw(mock: &NakadiMock, event_type: &str, body: impl Into<Vec<u8>>) -> Captured {
    let url = mock.submission_url(event_type).unwrap();
    let response = Client::new()
        .post(url.as_str())
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .send()
        .unwrap();
    capture(response)
}

/// Posts a JSON batch to the submission endpoint of `event_type`.
pub fn post_events(mock: &NakadiMock, event_type: &str, events: &Value) -> Captured {
    post_raw(mock, event_type, serde_json::to_vec(events).unwrap())
}

/// Converts a blocking response into a captured response.
pub fn capture(response: reqwest::blocking::Response) -> Captured {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let body = response.bytes().unwrap().to_vec();
    Captured {
        status,
        content_type,
        body,
    }
}

// ============================================================================
// SECTION: Audit Capture
// ============================================================================

/// Audit sink that records events in memory.
#[derive(Default)]
pub struct CapturingAuditSink {
    /// Recorded submissions.
    pub submissions: Mutex<Vec<SubmissionAuditEvent>>,
    /// Recorded bindings.
    pub bindings: Mutex<Vec<BindingAuditEvent>>,
}

impl CapturingAuditSink {
    /// Creates a shared capturing sink.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl MockAuditSink for CapturingAuditSink {
    fn record_submission(&self, event: &SubmissionAuditEvent) {
        self.submissions.lock().unwrap().push(event.clone());
    }

    fn record_binding(&self, event: &BindingAuditEvent) {
        self.bindings.lock().unwrap().push(event.clone());
    }
}
