// crates/nakadi-mock/src/server/tests.rs
// ============================================================================
// Module: Nakadi Mock Server Unit Tests
// Description: Unit tests for response conversion and URL construction.
// Purpose: Validate transport glue without binding sockets.
// Dependencies: nakadi-mock, axum
// ============================================================================

//! ## Overview
//! Exercises the conversion of encoded answers into axum responses and the
//! root URL mapping for wildcard binds.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;

use super::MockError;
use super::NakadiMock;
use super::encoded_response;
use super::root_url_for;
use super::submission_url_for;
use crate::answer::APPLICATION_PROBLEM_JSON;
use crate::answer::SubmissionAnswer;

// ============================================================================
// SECTION: Response Conversion
// ============================================================================

#[test]
fn accepted_answer_has_no_content_type() {
    let encoded = SubmissionAnswer::ok().encode().unwrap();
    let response = encoded_response(encoded);
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(CONTENT_TYPE).is_none());
}

#[test]
fn forbidden_answer_carries_problem_content_type() {
    let encoded = SubmissionAnswer::access_forbidden().encode().unwrap();
    let response = encoded_response(encoded);
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), APPLICATION_PROBLEM_JSON);
}

#[test]
fn multi_status_is_preserved() {
    let encoded = SubmissionAnswer::partial_submitted(Vec::new()).encode().unwrap();
    let response = encoded_response(encoded);
    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
}

// ============================================================================
// SECTION: URLs
// ============================================================================

#[test]
fn wildcard_bind_maps_to_loopback() {
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    assert_eq!(root_url_for(addr).unwrap().as_str(), "http://127.0.0.1:8080/");
}

#[test]
fn ipv6_bind_is_bracketed() {
    let addr: SocketAddr = "[::1]:9000".parse().unwrap();
    assert_eq!(root_url_for(addr).unwrap().as_str(), "http://[::1]:9000/");
}

#[test]
fn submission_url_appends_event_type_segment() {
    let root = root_url_for("127.0.0.1:8080".parse().unwrap()).unwrap();
    let url = submission_url_for(root, "order-placed_v2.created").unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8080/event-types/order-placed_v2.created/events");
}

#[test]
fn submission_url_keeps_reserved_characters_inside_one_segment() {
    let root = root_url_for("127.0.0.1:8080".parse().unwrap()).unwrap();
    let url = submission_url_for(root, "x?y#z").unwrap();
    assert_eq!(url.path(), "/event-types/x%3Fy%23z/events");
    assert_eq!(url.query(), None);
    assert_eq!(url.fragment(), None);
}

#[test]
fn root_url_requires_start() {
    let mock = NakadiMock::new();
    assert!(matches!(mock.root_url(), Err(MockError::NotStarted)));
    assert!(matches!(mock.submission_url("orders"), Err(MockError::NotStarted)));
}
