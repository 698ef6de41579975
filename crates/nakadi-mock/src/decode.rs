// crates/nakadi-mock/src/decode.rs
// ============================================================================
// Module: Batch Decoder
// Description: Decodes a buffered submission body into typed elements.
// Purpose: Turn a JSON array into an ordered batch using an element shape.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The submission body must be a JSON array. Each element is decoded on its
//! own with the bound [`ElementShape`]; the first element that does not fit
//! fails the whole batch.
//! Invariants:
//! - Decoded elements keep the array order.
//! - Elements are never dropped or replaced with defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::shape::ElementShape;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while decoding a submission body.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Body is not valid UTF-8.
    #[error("request body is not valid utf-8")]
    InvalidUtf8,
    /// Body is not a JSON array.
    #[error("request body is not a json array: {0}")]
    InvalidBatch(String),
    /// An element does not fit the bound shape.
    #[error("event at index {index} does not match the event type shape: {message}")]
    InvalidElement {
        /// Zero-based position of the element in the batch.
        index: usize,
        /// Parser message.
        message: String,
    },
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a complete submission body into a batch of `T`.
///
/// # Errors
///
/// Returns [`DecodeError`] when the body is not a JSON array or an element
/// does not fit `shape`.
pub fn decode_batch<T>(body: &[u8], shape: &ElementShape<T>) -> Result<Vec<T>, DecodeError> {
    let text = std::str::from_utf8(body).map_err(|_| DecodeError::InvalidUtf8)?;
    let elements: Vec<Value> =
        serde_json::from_str(text).map_err(|err| DecodeError::InvalidBatch(err.to_string()))?;
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            shape.parse(element).map_err(|message| DecodeError::InvalidElement {
                index,
                message,
            })
        })
        .collect()
}
