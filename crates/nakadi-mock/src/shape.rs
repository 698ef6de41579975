// crates/nakadi-mock/src/shape.rs
// ============================================================================
// Module: Element Shapes
// Description: Explicit descriptors for decoding one batch element.
// Purpose: Bind a concrete element type to a registration without reflection.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ElementShape`] tells the batch decoder how to turn one JSON array
//! element into a `T`. Shapes are supplied explicitly at the registration call
//! site, or derived from [`crate::SubmissionHandler::Event`] when the handler
//! type names its element type statically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Untyped element: a JSON object as a key-value map.
pub type UntypedEvent = Map<String, Value>;

/// Parse function signature used by shapes.
type ParseFn<T> = dyn Fn(Value) -> Result<T, String> + Send + Sync;

/// Descriptor for decoding one batch element into `T`.
///
/// # Invariants
/// - The label is stable for a given shape and is used in audit output.
pub struct ElementShape<T> {
    /// Human-readable shape label.
    label: String,
    /// Element parser.
    parse: Arc<ParseFn<T>>,
}

impl<T> Clone for ElementShape<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<T> fmt::Debug for ElementShape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementShape").field("label", &self.label).finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned + 'static> ElementShape<T> {
    /// Decodes elements with the type's serde implementation.
    #[must_use]
    pub fn json() -> Self {
        Self {
            label: type_name::<T>().to_string(),
            parse: Arc::new(|value| serde_json::from_value(value).map_err(|err| err.to_string())),
        }
    }
}

impl ElementShape<UntypedEvent> {
    /// Decodes elements as generic JSON objects.
    #[must_use]
    pub fn untyped() -> Self {
        Self {
            label: "untyped".to_string(),
            ..Self::json()
        }
    }
}

impl<T> ElementShape<T> {
    /// Decodes elements with a caller-supplied function.
    pub fn parser<F>(label: impl Into<String>, parse: F) -> Self
    where
        F: Fn(Value) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            parse: Arc::new(parse),
        }
    }

    /// Returns the shape label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parses a single element.
    ///
    /// # Errors
    ///
    /// Returns a message describing why the element does not fit the shape.
    pub fn parse(&self, value: Value) -> Result<T, String> {
        (self.parse)(value)
    }
}
