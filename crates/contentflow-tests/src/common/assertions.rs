// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Assertions

use axum::http::StatusCode;

use super::harness::TestResponse;

/// Asserts a failure response with the given status and error code.
///
/// Also checks the body carries a non-empty message and nothing that looks
/// like an internal detail.
#[track_caller]
pub fn assert_error(response: &TestResponse, status: StatusCode, code: &str) {
    assert_eq!(
        response.status, status,
        "expected {} {}, got body {}",
        status, code, response.body
    );
    assert_eq!(response.error_code(), Some(code), "body: {}", response.body);

    let message = response.body["message"].as_str().unwrap_or_default();
    assert!(!message.is_empty(), "missing message: {}", response.body);
}

/// Asserts a 500 whose message does not leak the underlying cause.
#[track_caller]
pub fn assert_internal_error(response: &TestResponse) {
    assert_error(response, StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR");
    let message = response.body["message"].as_str().unwrap_or_default();
    assert!(
        !message.contains("connection refused"),
        "internal detail leaked: {}",
        message
    );
}

/// Asserts the ids in a list response, in order.
#[track_caller]
pub fn assert_ids(response: &TestResponse, expected: &[&str]) {
    let ids: Vec<&str> = response
        .data()
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["id"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, expected, "body: {}", response.body);
}
