// crates/nakadi-mock/src/handler.rs
// ============================================================================
// Module: Submission Handlers
// Description: Handler trait plus the ignoring and collecting handlers.
// Purpose: Decide how the mock answers a decoded batch.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`SubmissionHandler`] names its element type through the associated
//! [`SubmissionHandler::Event`] type, which is how the element shape is inferred
//! when the handler is registered with
//! [`crate::EventTypeHandle::set_handler`]. Plain closures carry no such name
//! and are registered with an explicit [`crate::ElementShape`] instead.
//! Invariants:
//! - A handler receives the batch in submission order.
//! - A handler returns exactly one [`SubmissionAnswer`] per batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::de::DeserializeOwned;

use crate::answer::SubmissionAnswer;
use crate::shape::UntypedEvent;

// ============================================================================
// SECTION: Handler Trait
// ============================================================================

/// Handler for batches of one event type.
pub trait SubmissionHandler: Send + Sync + 'static {
    /// Element type each batch entry is decoded into.
    type Event: DeserializeOwned + Send + 'static;

    /// Processes a decoded batch and returns the verdict.
    fn process_batch(&self, batch: Vec<Self::Event>) -> SubmissionAnswer;
}

// ============================================================================
// SECTION: Ignoring Handler
// ============================================================================

/// Accepts every batch and discards it.
///
/// This is the handler of every event type created without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoringHandler;

impl SubmissionHandler for IgnoringHandler {
    type Event = UntypedEvent;

    fn process_batch(&self, _batch: Vec<Self::Event>) -> SubmissionAnswer {
        SubmissionAnswer::ok()
    }
}

// ============================================================================
// SECTION: Collecting Handler
// ============================================================================

/// Batches recorded by a [`CollectingHandler`].
#[derive(Debug)]
struct Collected<E> {
    /// Batches in arrival order.
    batches: Vec<Vec<E>>,
    /// All events of all batches, flattened in arrival order.
    events: Vec<E>,
}

/// Accepts every batch and records it.
///
/// Clones share storage, so a test keeps one clone while the mock owns another.
#[derive(Debug)]
pub struct CollectingHandler<E> {
    /// Shared recording.
    collected: Arc<Mutex<Collected<E>>>,
}

impl<E> Clone for CollectingHandler<E> {
    fn clone(&self) -> Self {
        Self {
            collected: Arc::clone(&self.collected),
        }
    }
}

impl<E> Default for CollectingHandler<E> {
    fn default() -> Self {
        Self {
            collected: Arc::new(Mutex::new(Collected {
                batches: Vec::new(),
                events: Vec::new(),
            })),
        }
    }
}

impl<E: Clone> CollectingHandler<E> {
    /// Creates an empty collecting handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every submitted batch in arrival order.
    #[must_use]
    pub fn submitted_batches(&self) -> Vec<Vec<E>> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner).batches.clone()
    }

    /// Returns every submitted event across all batches in arrival order.
    #[must_use]
    pub fn submitted_events(&self) -> Vec<E> {
        self.collected.lock().unwrap_or_else(PoisonError::into_inner).events.clone()
    }

    /// Records a batch.
    fn record(&self, batch: Vec<E>) {
        let mut collected = self.collected.lock().unwrap_or_else(PoisonError::into_inner);
        collected.events.extend(batch.iter().cloned());
        collected.batches.push(batch);
    }
}

impl<E> SubmissionHandler for CollectingHandler<E>
where
    E: DeserializeOwned + Clone + Send + 'static,
{
    type Event = E;

    fn process_batch(&self, batch: Vec<E>) -> SubmissionAnswer {
        self.record(batch);
        SubmissionAnswer::ok()
    }
}
