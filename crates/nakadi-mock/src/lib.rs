// crates/nakadi-mock/src/lib.rs
// ============================================================================
// Module: Nakadi Mock Library
// Description: Test double for the Nakadi event submission endpoint.
// Purpose: Let client tests publish to a local broker with scripted answers.
// Dependencies: axum, serde, serde_json, tokio, url
// ============================================================================

//! ## Overview
//! Nakadi Mock serves `POST /event-types/{type}/events` on an ephemeral local
//! port. Tests register a handler per event type; each submitted batch is
//! decoded into the handler's element type, passed to the handler, and the
//! returned [`SubmissionAnswer`] is encoded exactly as Nakadi's publishing API
//! would answer (200, 207, 422, 401 or 403).
//! Invariants:
//! - Unregistered event types answer 404 without a body.
//! - Undecodable bodies answer 400; faulting handlers answer 500.
//! - Each mock owns its registry; mocks in one process are independent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod answer;
pub mod audit;
pub mod binding;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod events;
pub mod handler;
pub mod problem;
pub mod registry;
pub mod server;
pub mod shape;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use answer::APPLICATION_JSON;
pub use answer::APPLICATION_PROBLEM_JSON;
pub use answer::BatchItemResponse;
pub use answer::EncodedAnswer;
pub use answer::PublishingStatus;
pub use answer::PublishingStep;
pub use answer::SubmissionAnswer;
pub use audit::BindingAuditEvent;
pub use audit::FileAuditSink;
pub use audit::MockAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::SubmissionAuditEvent;
pub use binding::EventTypeBinding;
pub use binding::ProcessedBatch;
pub use config::AuditConfig;
pub use config::AuditSinkType;
pub use config::ConfigError;
pub use config::MockConfig;
pub use config::ServerConfig;
pub use decode::DecodeError;
pub use decode::decode_batch;
pub use dispatch::DispatchError;
pub use dispatch::Dispatcher;
pub use events::DataChangeEvent;
pub use events::DataOperation;
pub use events::EventMetadata;
pub use handler::CollectingHandler;
pub use handler::IgnoringHandler;
pub use handler::SubmissionHandler;
pub use problem::Problem;
pub use registry::BindingError;
pub use registry::EventTypeHandle;
pub use registry::EventTypeRegistry;
pub use server::MockError;
pub use server::NakadiMock;
pub use server::SUBMISSION_ROUTE;
pub use shape::ElementShape;
pub use shape::UntypedEvent;
