// crates/nakadi-mock/src/problem.rs
// ============================================================================
// Module: Problem Responses
// Description: RFC 7807 problem bodies for mock-generated failures.
// Purpose: Report decode failures and handler faults the way Nakadi does.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Nakadi reports request-level failures as `application/problem+json`
//! documents whose `type` points at `httpstatus.es`. The mock uses the same
//! shape for failures it detects itself (undecodable bodies, faulting
//! handlers). Handler-chosen auth answers keep their empty body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::answer::APPLICATION_PROBLEM_JSON;
use crate::answer::EncodedAnswer;

// ============================================================================
// SECTION: Problem
// ============================================================================

/// Problem document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short status title.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Human-readable explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    /// Builds a problem for the status with the provided detail.
    #[must_use]
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            problem_type: format!("https://httpstatus.es/{status}"),
            title: status_title(status).to_string(),
            status,
            detail: Some(detail.into()),
        }
    }

    /// Encodes the problem as a response.
    #[must_use]
    pub fn encode(&self) -> EncodedAnswer {
        // A problem body is plain strings and a number; serialization cannot fail.
        let body = serde_json::to_vec(self).unwrap_or_default();
        EncodedAnswer {
            status: self.status,
            content_type: Some(APPLICATION_PROBLEM_JSON),
            body,
        }
    }
}

/// Reason phrase for the statuses the mock generates.
const fn status_title(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Content Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Error",
    }
}
