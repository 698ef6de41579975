// crates/nakadi-mock/tests/answer_encoding.rs
// ============================================================================
// Module: Answer Encoding Tests
// Description: Wire format of submission answers and problem documents.
// Purpose: Verify status codes, content types and batch item bodies.
// Dependencies: nakadi-mock, serde_json
// ============================================================================

//! ## Overview
//! Checks that every answer factory encodes to the status, content type and
//! body the Nakadi publishing API produces.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use nakadi_mock::APPLICATION_JSON;
use nakadi_mock::APPLICATION_PROBLEM_JSON;
use nakadi_mock::BatchItemResponse;
use nakadi_mock::Problem;
use nakadi_mock::PublishingStatus;
use nakadi_mock::PublishingStep;
use nakadi_mock::SubmissionAnswer;
use serde_json::json;

// ============================================================================
// SECTION: Simple Answers
// ============================================================================

#[test]
fn ok_answer_is_200_without_body() {
    let encoded = SubmissionAnswer::ok().encode().unwrap();
    assert_eq!(encoded.status, 200);
    assert_eq!(encoded.content_type, None);
    assert!(encoded.body.is_empty());
}

#[test]
fn auth_answers_use_problem_content_type_and_empty_body() {
    let unauthenticated = SubmissionAnswer::not_authenticated().encode().unwrap();
    assert_eq!(unauthenticated.status, 401);
    assert_eq!(unauthenticated.content_type, Some(APPLICATION_PROBLEM_JSON));
    assert!(unauthenticated.body.is_empty());

    let forbidden = SubmissionAnswer::access_forbidden().encode().unwrap();
    assert_eq!(forbidden.status, 403);
    assert_eq!(forbidden.content_type, Some(APPLICATION_PROBLEM_JSON));
    assert!(forbidden.body.is_empty());
}

// ============================================================================
// SECTION: Batch Results
// ============================================================================

#[test]
fn partial_submitted_encodes_items_in_order() {
    let answer = SubmissionAnswer::partial_submitted(vec![
        BatchItemResponse::submitted("e-1"),
        BatchItemResponse::failed("e-2", PublishingStep::Publishing, "broker unavailable"),
        BatchItemResponse::aborted("e-3", PublishingStep::None, "earlier event failed"),
    ]);
    let encoded = answer.encode().unwrap();
    assert_eq!(encoded.status, 207);
    assert_eq!(encoded.content_type, Some(APPLICATION_JSON));
    let body: serde_json::Value = serde_json::from_slice(&encoded.body).unwrap();
    assert_eq!(
        body,
        json!([
            { "eid": "e-1", "publishing_status": "submitted" },
            {
                "eid": "e-2",
                "publishing_status": "failed",
                "step": "publishing",
                "detail": "broker unavailable"
            },
            {
                "eid": "e-3",
                "publishing_status": "aborted",
                "step": "none",
                "detail": "earlier event failed"
            }
        ])
    );
}

#[test]
fn unset_fields_are_omitted_not_null() {
    let answer = SubmissionAnswer::partial_validation(vec![BatchItemResponse::new(
        "e-1",
        PublishingStatus::Failed,
        Some(PublishingStep::Validating),
        None,
    )]);
    let encoded = answer.encode().unwrap();
    assert_eq!(encoded.status, 422);
    let text = String::from_utf8(encoded.body).unwrap();
    assert_eq!(text, r#"[{"eid":"e-1","publishing_status":"failed","step":"validating"}]"#);
    assert!(!text.contains("null"));
}

#[test]
fn empty_item_list_encodes_empty_array() {
    let encoded = SubmissionAnswer::partial_validation(Vec::new()).encode().unwrap();
    assert_eq!(encoded.status, 422);
    assert_eq!(encoded.body, b"[]".to_vec());
}

#[test]
fn status_and_items_accessors() {
    let items = vec![BatchItemResponse::submitted("e-9")];
    let answer = SubmissionAnswer::partial_submitted(items.clone());
    assert_eq!(answer.status(), 207);
    assert_eq!(answer.items(), items.as_slice());
    assert!(SubmissionAnswer::ok().items().is_empty());
    assert_eq!(SubmissionAnswer::access_forbidden().status(), 403);
}

#[test]
fn wire_labels_match_serde_names() {
    assert_eq!(PublishingStatus::Aborted.as_str(), "aborted");
    assert_eq!(PublishingStep::Partitioning.as_str(), "partitioning");
    let step: PublishingStep = serde_json::from_str("\"enriching\"").unwrap();
    assert_eq!(step, PublishingStep::Enriching);
}

// ============================================================================
// SECTION: Problems
// ============================================================================

#[test]
fn problem_document_shape() {
    let encoded = Problem::new(400, "request body is not a json array").encode();
    assert_eq!(encoded.status, 400);
    assert_eq!(encoded.content_type, Some(APPLICATION_PROBLEM_JSON));
    let body: serde_json::Value = serde_json::from_slice(&encoded.body).unwrap();
    assert_eq!(
        body,
        json!({
            "type": "https://httpstatus.es/400",
            "title": "Bad Request",
            "status": 400,
            "detail": "request body is not a json array"
        })
    );
}
