// crates/nakadi-mock/src/registry.rs
// ============================================================================
// Module: Event Type Registry
// Description: Per-mock mapping from event type name to binding.
// Purpose: Register, rebind and look up event types safely under traffic.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The registry is owned by one mock instance; several mocks in one process
//! never share bindings. Lookups may run concurrently with registration.
//! Invariants:
//! - Registration overwrites any prior binding for the name (last write wins).
//! - Bindings are replaced as a whole, so a reader sees either the old or the
//!   new shape/handler pair, never a mix.
//! - Event type names follow the Nakadi grammar: dot-separated labels of
//!   ASCII alphanumerics, `-` and `_`, starting with a letter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::Weak;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::answer::SubmissionAnswer;
use crate::audit::BindingAuditEvent;
use crate::audit::MockAuditSink;
use crate::binding::EventTypeBinding;
use crate::handler::SubmissionHandler;
use crate::shape::ElementShape;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Name does not follow the Nakadi event type name grammar.
    #[error("invalid event type name: '{0}'")]
    InvalidName(String),
    /// The mock owning the event type no longer exists.
    #[error("event type {0} is detached from its mock")]
    Detached(String),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Event type bindings of one mock instance.
pub struct EventTypeRegistry {
    /// Bindings keyed by event type name.
    bindings: RwLock<BTreeMap<String, Arc<EventTypeBinding>>>,
    /// Audit sink for registration events.
    audit: Arc<dyn MockAuditSink>,
}

impl EventTypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(audit: Arc<dyn MockAuditSink>) -> Self {
        Self {
            bindings: RwLock::new(BTreeMap::new()),
            audit,
        }
    }

    /// Creates or resets `name` with the ignoring handler and returns a handle.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::InvalidName`] when `name` is not a valid
    /// event type name.
    pub fn register(self: &Arc<Self>, name: &str) -> Result<EventTypeHandle, BindingError> {
        validate_name(name)?;
        self.install(EventTypeBinding::ignoring(name));
        Ok(EventTypeHandle {
            name: name.to_string(),
            registry: Arc::downgrade(self),
        })
    }

    /// Returns the current binding for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<EventTypeBinding>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner).get(name).map(Arc::clone)
    }

    /// Returns the registered event type names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }

    /// Removes every binding.
    pub fn clear(&self) {
        self.bindings.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Installs a binding, replacing any prior binding of the same name.
    fn install(&self, binding: EventTypeBinding) {
        let event = BindingAuditEvent::new(binding.name(), binding.element_shape());
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(binding.name().to_string(), Arc::new(binding));
        self.audit.record_binding(&event);
    }
}

/// Validates an event type name against the Nakadi name grammar:
/// `[A-Za-z][-0-9A-Za-z_]*(\.[0-9A-Za-z][-0-9A-Za-z_]*)*`.
fn validate_name(name: &str) -> Result<(), BindingError> {
    let mut labels = name.split('.');
    let first_ok = labels
        .next()
        .is_some_and(|label| valid_label(label, |lead| lead.is_ascii_alphabetic()));
    if first_ok && labels.all(|label| valid_label(label, |lead| lead.is_ascii_alphanumeric())) {
        return Ok(());
    }
    Err(BindingError::InvalidName(name.to_string()))
}

/// Checks one dot-separated label: a leading character accepted by `lead`,
/// then ASCII alphanumerics, `-` or `_`.
fn valid_label(label: &str, lead: impl Fn(char) -> bool) -> bool {
    let mut chars = label.chars();
    chars.next().is_some_and(lead)
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

// ============================================================================
// SECTION: Handles
// ============================================================================

/// Configuration handle for one event type.
///
/// The handle does not keep its mock alive; binding through a handle whose
/// mock was dropped fails with [`BindingError::Detached`].
#[derive(Debug, Clone)]
pub struct EventTypeHandle {
    /// Event type name.
    name: String,
    /// Owning registry.
    registry: Weak<EventTypeRegistry>,
}

impl EventTypeHandle {
    /// Returns the event type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds a handler, inferring the element shape from `H::Event`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Detached`] when the mock no longer exists.
    pub fn set_handler<H: SubmissionHandler>(&self, handler: H) -> Result<(), BindingError> {
        self.bind(EventTypeBinding::with_handler(self.name.as_str(), handler))
    }

    /// Binds a handler function with an explicit element shape.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Detached`] when the mock no longer exists.
    pub fn set_handler_with<T, F>(
        &self,
        shape: ElementShape<T>,
        handler: F,
    ) -> Result<(), BindingError>
    where
        T: 'static,
        F: Fn(Vec<T>) -> SubmissionAnswer + Send + Sync + 'static,
    {
        self.bind(EventTypeBinding::with_shape(self.name.as_str(), shape, handler))
    }

    /// Binds a handler function decoding elements with `T`'s serde implementation.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Detached`] when the mock no longer exists.
    pub fn set_handler_for<T, F>(&self, handler: F) -> Result<(), BindingError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(Vec<T>) -> SubmissionAnswer + Send + Sync + 'static,
    {
        self.set_handler_with(ElementShape::<T>::json(), handler)
    }

    /// Installs a binding in the owning registry.
    fn bind(&self, binding: EventTypeBinding) -> Result<(), BindingError> {
        let registry =
            self.registry.upgrade().ok_or_else(|| BindingError::Detached(self.name.clone()))?;
        registry.install(binding);
        Ok(())
    }
}
