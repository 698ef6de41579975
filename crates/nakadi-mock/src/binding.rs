// crates/nakadi-mock/src/binding.rs
// ============================================================================
// Module: Event Type Bindings
// Description: Pairs an element shape with the handler that consumes it.
// Purpose: Keep decode strategy and handler in one immutable unit.
// Dependencies: std
// ============================================================================

//! ## Overview
//! An [`EventTypeBinding`] erases the element type behind [`BatchProcessor`],
//! so the registry can hold bindings of different element types side by side.
//! Invariants:
//! - A binding is immutable; rebinding an event type installs a new binding.
//! - Shape and handler are always swapped together.
//! - A panicking handler is reported as a fault and leaves no shared state behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::answer::SubmissionAnswer;
use crate::decode::decode_batch;
use crate::dispatch::DispatchError;
use crate::handler::IgnoringHandler;
use crate::handler::SubmissionHandler;
use crate::shape::ElementShape;

// ============================================================================
// SECTION: Batch Processing
// ============================================================================

/// Outcome of running one body through a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedBatch {
    /// Number of decoded events.
    pub batch_size: usize,
    /// Handler verdict.
    pub answer: SubmissionAnswer,
}

/// Decodes a body and hands the batch to a handler.
pub(crate) trait BatchProcessor: Send + Sync {
    /// Runs the decode and handler steps for one body.
    fn process(&self, body: &[u8]) -> Result<ProcessedBatch, DispatchError>;
}

/// Typed processor holding the shape and the handler function.
struct TypedProcessor<T, F> {
    /// Element shape.
    shape: ElementShape<T>,
    /// Handler function.
    handler: F,
}

impl<T, F> BatchProcessor for TypedProcessor<T, F>
where
    T: 'static,
    F: Fn(Vec<T>) -> SubmissionAnswer + Send + Sync + 'static,
{
    fn process(&self, body: &[u8]) -> Result<ProcessedBatch, DispatchError> {
        let batch = decode_batch(body, &self.shape)?;
        let batch_size = batch.len();
        let answer = panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(batch)))
            .map_err(|payload| DispatchError::HandlerFault(panic_message(payload.as_ref())))?;
        Ok(ProcessedBatch {
            batch_size,
            answer,
        })
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

// ============================================================================
// SECTION: Binding
// ============================================================================

/// Binding of one event type name to its shape and handler.
///
/// # Invariants
/// - `name` never changes after construction.
pub struct EventTypeBinding {
    /// Event type name.
    name: String,
    /// Label of the bound element shape.
    element_shape: String,
    /// Erased shape + handler pair.
    processor: Arc<dyn BatchProcessor>,
}

impl fmt::Debug for EventTypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTypeBinding")
            .field("name", &self.name)
            .field("element_shape", &self.element_shape)
            .finish_non_exhaustive()
    }
}

impl EventTypeBinding {
    /// Binds a handler function with an explicit element shape.
    pub(crate) fn with_shape<T, F>(name: impl Into<String>, shape: ElementShape<T>, handler: F) -> Self
    where
        T: 'static,
        F: Fn(Vec<T>) -> SubmissionAnswer + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            element_shape: shape.label().to_string(),
            processor: Arc::new(TypedProcessor {
                shape,
                handler,
            }),
        }
    }

    /// Binds a handler whose element shape comes from its `Event` type.
    pub(crate) fn with_handler<H: SubmissionHandler>(name: impl Into<String>, handler: H) -> Self {
        Self::with_shape(name, ElementShape::<H::Event>::json(), move |batch| {
            handler.process_batch(batch)
        })
    }

    /// Default binding: untyped elements, every batch accepted and discarded.
    pub(crate) fn ignoring(name: impl Into<String>) -> Self {
        Self::with_shape(name, ElementShape::untyped(), move |batch| {
            IgnoringHandler.process_batch(batch)
        })
    }

    /// Returns the event type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the label of the bound element shape.
    #[must_use]
    pub fn element_shape(&self) -> &str {
        &self.element_shape
    }

    /// Decodes `body` and runs the handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Decode`] when the body does not decode and
    /// [`DispatchError::HandlerFault`] when the handler panics.
    pub fn process(&self, body: &[u8]) -> Result<ProcessedBatch, DispatchError> {
        self.processor.process(body)
    }
}
