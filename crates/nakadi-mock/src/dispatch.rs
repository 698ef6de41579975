// crates/nakadi-mock/src/dispatch.rs
// ============================================================================
// Module: Request Dispatcher
// Description: Routes a submission to its binding and encodes the result.
// Purpose: Implement the dispatch-decode-handle-encode pipeline.
// Dependencies: thiserror, serde_json
// ============================================================================

//! ## Overview
//! [`Dispatcher`] is transport-neutral: it takes the event type name from the
//! submission path and the fully buffered body, and yields an
//! [`EncodedAnswer`]. Failures map as follows:
//! - unknown event type: 404, no body, no content type;
//! - undecodable body: 400 problem document;
//! - body over the size limit of a known event type: 413 problem document;
//! - handler fault or unencodable answer: 500 problem document.
//!
//! Invariants:
//! - A failed request never mutates the registry.
//! - The binding is looked up once per request, so shape and handler always
//!   come from the same registration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::answer::EncodedAnswer;
use crate::audit::MockAuditSink;
use crate::audit::SubmissionAuditEvent;
use crate::binding::ProcessedBatch;
use crate::decode::DecodeError;
use crate::problem::Problem;
use crate::registry::EventTypeRegistry;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request-level failures of the submission pipeline.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No binding exists for the event type.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    /// Body could not be decoded into the bound shape.
    #[error("invalid submission body: {0}")]
    Decode(#[from] DecodeError),
    /// Handler panicked.
    #[error("submission handler failed: {0}")]
    HandlerFault(String),
    /// Handler answer could not be encoded.
    #[error("answer encoding failed: {0}")]
    Encode(String),
    /// Body exceeds the configured size limit.
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

impl DispatchError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownEventType(_) => "unknown_event_type",
            Self::Decode(_) => "decode",
            Self::HandlerFault(_) => "handler_fault",
            Self::Encode(_) => "encode",
            Self::BodyTooLarge(_) => "body_too_large",
        }
    }

    /// Encodes the failure as a response.
    #[must_use]
    pub fn encode(&self) -> EncodedAnswer {
        match self {
            Self::UnknownEventType(_) => EncodedAnswer::empty(404, None),
            Self::Decode(err) => Problem::new(400, err.to_string()).encode(),
            Self::BodyTooLarge(_) => Problem::new(413, self.to_string()).encode(),
            Self::HandlerFault(_) | Self::Encode(_) => Problem::new(500, self.to_string()).encode(),
        }
    }
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Routes submissions to registry bindings.
#[derive(Clone)]
pub struct Dispatcher {
    /// Bindings by event type name.
    registry: Arc<EventTypeRegistry>,
    /// Audit sink for submission events.
    audit: Arc<dyn MockAuditSink>,
}

impl Dispatcher {
    /// Creates a dispatcher over the registry.
    #[must_use]
    pub fn new(registry: Arc<EventTypeRegistry>, audit: Arc<dyn MockAuditSink>) -> Self {
        Self {
            registry,
            audit,
        }
    }

    /// Runs a submission through its binding.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the event type is unknown, the body does
    /// not decode, or the handler faults.
    pub fn dispatch(&self, event_type: &str, body: &[u8]) -> Result<ProcessedBatch, DispatchError> {
        let binding = self
            .registry
            .lookup(event_type)
            .ok_or_else(|| DispatchError::UnknownEventType(event_type.to_string()))?;
        binding.process(body)
    }

    /// Returns whether `event_type` currently has a binding.
    #[must_use]
    pub fn is_registered(&self, event_type: &str) -> bool {
        self.registry.lookup(event_type).is_some()
    }

    /// Runs a submission and encodes the verdict or the failure.
    #[must_use]
    pub fn handle(&self, event_type: &str, body: &[u8]) -> EncodedAnswer {
        let result = self.dispatch(event_type, body).and_then(|processed| {
            let encoded =
                processed.answer.encode().map_err(|err| DispatchError::Encode(err.to_string()))?;
            Ok((processed.batch_size, encoded))
        });
        match result {
            Ok((batch_size, encoded)) => {
                self.audit.record_submission(&SubmissionAuditEvent::new(
                    event_type,
                    encoded.status,
                    Some(batch_size),
                    body.len(),
                    encoded.body.len(),
                    None,
                ));
                encoded
            }
            Err(err) => self.reject(event_type, body.len(), &err),
        }
    }

    /// Encodes a request-level failure and records it.
    #[must_use]
    pub fn reject(
        &self,
        event_type: &str,
        request_bytes: usize,
        err: &DispatchError,
    ) -> EncodedAnswer {
        let encoded = err.encode();
        self.audit.record_submission(&SubmissionAuditEvent::new(
            event_type,
            encoded.status,
            None,
            request_bytes,
            encoded.body.len(),
            Some(err.kind()),
        ));
        encoded
    }
}
