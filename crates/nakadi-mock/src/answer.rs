// crates/nakadi-mock/src/answer.rs
// ============================================================================
// Module: Submission Answers
// Description: Handler verdicts and their Nakadi publishing wire encoding.
// Purpose: Reproduce the broker's batch-item response format exactly.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`SubmissionAnswer`] is the verdict a handler returns for one submitted
//! batch. Answers are built only through the named factories ([`SubmissionAnswer::ok`],
//! [`SubmissionAnswer::partial_submitted`], ...) and turned into status, content
//! type and body by [`SubmissionAnswer::encode`].
//! Invariants:
//! - `eid` and `publishing_status` are always encoded; `step` and `detail` are
//!   omitted entirely when unset, never emitted as `null`.
//! - Batch items are encoded in the order the handler returned them.
//! - Auth answers carry `application/problem+json` with an empty body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type of batch-item response bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Content type of problem responses (RFC 7807).
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

// ============================================================================
// SECTION: Batch Item Responses
// ============================================================================

/// Publishing outcome of a single event in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishingStatus {
    /// Event was published.
    Submitted,
    /// Event failed in one of the publishing steps.
    Failed,
    /// Event was not attempted because another event of the batch failed.
    Aborted,
}

impl PublishingStatus {
    /// Returns the wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

/// Publishing step an event reached before its outcome was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishingStep {
    /// No step was attempted.
    None,
    /// Schema validation.
    Validating,
    /// Partition resolution.
    Partitioning,
    /// Metadata enrichment.
    Enriching,
    /// Write to the storage backend.
    Publishing,
}

impl PublishingStep {
    /// Returns the wire label for the step.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Validating => "validating",
            Self::Partitioning => "partitioning",
            Self::Enriching => "enriching",
            Self::Publishing => "publishing",
        }
    }
}

/// Per-event report included in 207 and 422 responses.
///
/// # Invariants
/// - Field order on the wire is `eid`, `publishing_status`, `step`, `detail`.
/// - Unset optional fields are skipped during serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemResponse {
    /// Event identifier (`metadata.eid` of the submitted event).
    pub eid: String,
    /// Publishing outcome.
    #[serde(rename = "publishing_status")]
    pub status: PublishingStatus,
    /// Step the event reached, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<PublishingStep>,
    /// Free-text detail, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl BatchItemResponse {
    /// Creates a batch item with every field explicit.
    #[must_use]
    pub fn new(
        eid: impl Into<String>,
        status: PublishingStatus,
        step: Option<PublishingStep>,
        detail: Option<String>,
    ) -> Self {
        Self {
            eid: eid.into(),
            status,
            step,
            detail,
        }
    }

    /// Creates a `submitted` item without step or detail.
    #[must_use]
    pub fn submitted(eid: impl Into<String>) -> Self {
        Self::new(eid, PublishingStatus::Submitted, None, None)
    }

    /// Creates a `failed` item at the given step.
    #[must_use]
    pub fn failed(eid: impl Into<String>, step: PublishingStep, detail: impl Into<String>) -> Self {
        Self::new(eid, PublishingStatus::Failed, Some(step), Some(detail.into()))
    }

    /// Creates an `aborted` item at the given step.
    #[must_use]
    pub fn aborted(eid: impl Into<String>, step: PublishingStep, detail: impl Into<String>) -> Self {
        Self::new(eid, PublishingStatus::Aborted, Some(step), Some(detail.into()))
    }
}

// ============================================================================
// SECTION: Submission Answers
// ============================================================================

/// Status family of a batch result answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchOutcome {
    /// 207 Multi-Status: some events were not published.
    PartiallySubmitted,
    /// 422 Unprocessable Entity: validation failed, nothing was published.
    ValidationFailed,
}

impl BatchOutcome {
    /// HTTP status for the outcome.
    const fn status(self) -> u16 {
        match self {
            Self::PartiallySubmitted => 207,
            Self::ValidationFailed => 422,
        }
    }
}

/// Closed set of verdicts.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AnswerKind {
    /// 200, no body.
    Accepted,
    /// 401, problem content type, no body.
    Unauthenticated,
    /// 403, problem content type, no body.
    Forbidden,
    /// 207 or 422 with batch item reports.
    BatchResult(BatchOutcome, Vec<BatchItemResponse>),
}

/// Verdict returned by a submission handler for one batch.
///
/// # Invariants
/// - Constructed only through the named factories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAnswer {
    /// Verdict variant.
    kind: AnswerKind,
}

impl SubmissionAnswer {
    /// The whole batch was published (200).
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            kind: AnswerKind::Accepted,
        }
    }

    /// Some events were not published (207) with one report per event.
    #[must_use]
    pub const fn partial_submitted(items: Vec<BatchItemResponse>) -> Self {
        Self {
            kind: AnswerKind::BatchResult(BatchOutcome::PartiallySubmitted, items),
        }
    }

    /// The batch failed validation (422) with one report per event.
    #[must_use]
    pub const fn partial_validation(items: Vec<BatchItemResponse>) -> Self {
        Self {
            kind: AnswerKind::BatchResult(BatchOutcome::ValidationFailed, items),
        }
    }

    /// The client is not authenticated (401).
    #[must_use]
    pub const fn not_authenticated() -> Self {
        Self {
            kind: AnswerKind::Unauthenticated,
        }
    }

    /// The client may not publish to this event type (403).
    #[must_use]
    pub const fn access_forbidden() -> Self {
        Self {
            kind: AnswerKind::Forbidden,
        }
    }

    /// Returns the HTTP status code of the answer.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match &self.kind {
            AnswerKind::Accepted => 200,
            AnswerKind::Unauthenticated => 401,
            AnswerKind::Forbidden => 403,
            AnswerKind::BatchResult(outcome, _) => outcome.status(),
        }
    }

    /// Returns the batch item reports, empty for non-batch answers.
    #[must_use]
    pub fn items(&self) -> &[BatchItemResponse] {
        match &self.kind {
            AnswerKind::BatchResult(_, items) => items,
            _ => &[],
        }
    }

    /// Encodes the answer into status, content type and body.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when batch items fail to serialize.
    pub fn encode(&self) -> Result<EncodedAnswer, serde_json::Error> {
        let encoded = match &self.kind {
            AnswerKind::Accepted => EncodedAnswer::empty(200, None),
            AnswerKind::Unauthenticated => EncodedAnswer::empty(401, Some(APPLICATION_PROBLEM_JSON)),
            AnswerKind::Forbidden => EncodedAnswer::empty(403, Some(APPLICATION_PROBLEM_JSON)),
            AnswerKind::BatchResult(outcome, items) => EncodedAnswer {
                status: outcome.status(),
                content_type: Some(APPLICATION_JSON),
                body: serde_json::to_vec(items)?,
            },
        };
        Ok(encoded)
    }
}

// ============================================================================
// SECTION: Encoded Answers
// ============================================================================

/// Transport-neutral response triple.
///
/// # Invariants
/// - `content_type` is `None` only for responses the broker sends without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAnswer {
    /// HTTP status code.
    pub status: u16,
    /// Content type header value, if any.
    pub content_type: Option<&'static str>,
    /// Response body bytes (empty for no body).
    pub body: Vec<u8>,
}

impl EncodedAnswer {
    /// Builds a response without a body.
    #[must_use]
    pub const fn empty(status: u16, content_type: Option<&'static str>) -> Self {
        Self {
            status,
            content_type,
            body: Vec::new(),
        }
    }
}
