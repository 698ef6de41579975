// crates/nakadi-mock/src/events.rs
// ============================================================================
// Module: Event Payload Shapes
// Description: Ready-made element types for Nakadi data change events.
// Purpose: Decode common Nakadi payloads without hand-written structs.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! [`DataChangeEvent`] mirrors the Nakadi data change event category with
//! `D` as the embedded data type. [`EventMetadata`] is the `metadata` object
//! shared by all categories; business event shapes can embed it as a field.
//! Every field is optional so partially filled test payloads still decode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Event metadata envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Event identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,
    /// Event type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Time the event occurred.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub occurred_at: Option<OffsetDateTime>,
    /// Flow identifier for request tracing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
}

// ============================================================================
// SECTION: Data Change Events
// ============================================================================

/// Data change operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataOperation {
    /// Entity created.
    #[serde(rename = "C")]
    Create,
    /// Entity updated.
    #[serde(rename = "U")]
    Update,
    /// Entity deleted.
    #[serde(rename = "D")]
    Delete,
    /// Snapshot of the entity.
    #[serde(rename = "S")]
    Snapshot,
}

/// Data change event carrying `D` as payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChangeEvent<D> {
    /// Changed entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
    /// Entity type label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Operation applied to the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_op: Option<DataOperation>,
    /// Event metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

impl<D> DataChangeEvent<D> {
    /// Returns the event identifier, if present.
    #[must_use]
    pub fn eid(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|metadata| metadata.eid.as_deref())
    }
}
