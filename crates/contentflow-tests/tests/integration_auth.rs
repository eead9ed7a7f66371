// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Token Verifier and Role Gate
//!
//! - `test_token_*`: credential extraction and verification
//! - `test_identity_*`: user lookup and account status
//! - `test_role_*`: flat role allow-lists
//! - `test_error_*`: response shape

use std::sync::Arc;

use axum::http::StatusCode;
use contentflow_api::auth::JwtManager;
use contentflow_tests::prelude::*;

// =============================================================================
// Token
// =============================================================================

#[tokio::test]
async fn test_token_missing_is_401() {
    let app = TestApp::new();

    for uri in [
        "/api/v1/auth/me",
        "/api/v1/admin/users",
        "/api/v1/content",
        &format!("/api/v1/workspaces/{}", Ids::WORKSPACE),
        &format!("/api/v1/clients/{}", Ids::CLIENT_CO),
    ] {
        let response = app.get(uri, None).await;
        assert_error(&response, StatusCode::UNAUTHORIZED, "MISSING_TOKEN");
    }
}

#[tokio::test]
async fn test_token_wrong_scheme_is_missing() {
    let app = TestApp::new();
    let token = app.token_for(Ids::ADMIN);

    let response = app
        .get_with_authorization("/api/v1/auth/me", &format!("Token {}", token))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "MISSING_TOKEN");

    let response = app.get_with_authorization("/api/v1/auth/me", "Bearer ").await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "MISSING_TOKEN");
}

#[tokio::test]
async fn test_token_malformed_is_invalid() {
    let app = TestApp::new();
    let response = app.get("/api/v1/auth/me", Some("not.a.jwt")).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_token_expired_is_distinct_from_invalid() {
    let app = TestApp::new();

    let expired = app.get("/api/v1/auth/me", Some(&app.expired_token_for(Ids::ADMIN))).await;
    assert_error(&expired, StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED");

    let garbage = app.get("/api/v1/auth/me", Some("garbage")).await;
    assert_error(&garbage, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");

    assert_ne!(expired.error_code(), garbage.error_code());
}

#[tokio::test]
async fn test_token_signed_with_other_secret() {
    let app = TestApp::new();
    let foreign = JwtManager::new(
        contentflow_api::auth::JwtConfig::new("some-other-secret-that-is-long-enough!!"),
    )
    .unwrap()
    .create_access_token(Ids::typed(Ids::ADMIN))
    .unwrap();

    let response = app.get("/api/v1/auth/me", Some(&foreign)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_token_public_paths_skip_verification() {
    let app = TestApp::new();
    app.get("/health", None).await.assert_ok();
    app.get("/ready", None).await.assert_ok();
    app.get("/health", Some("garbage")).await.assert_ok();
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn test_identity_unknown_subject() {
    let app = TestApp::new();
    let token = app.token_for("99999999-9999-4999-8999-999999999999");

    let response = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_error(&response, StatusCode::UNAUTHORIZED, "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_identity_inactive_denied_regardless_of_role() {
    let app = TestApp::new();

    // A suspended admin gets nothing, not even the admin bypass.
    for (user, uri) in [
        (Ids::SUSPENDED_ADMIN, "/api/v1/admin/users".to_string()),
        (Ids::SUSPENDED_ADMIN, format!("/api/v1/workspaces/{}", Ids::WORKSPACE)),
        (Ids::INACTIVE, "/api/v1/auth/me".to_string()),
    ] {
        let response = app.get(&uri, Some(&app.token_for(user))).await;
        assert_error(&response, StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE");
    }
}

#[tokio::test]
async fn test_identity_me_returns_user() {
    let app = TestApp::new();
    let response = app.get("/api/v1/auth/me", Some(&app.token_for(Ids::OWNER))).await;

    response.assert_ok();
    assert_eq!(response.data()["user"]["id"], Ids::OWNER);
    assert_eq!(response.data()["user"]["role"], "creator");
    assert!(response.data().get("client").is_none_or(|c| c.is_null()));
}

#[tokio::test]
async fn test_identity_me_includes_linked_client() {
    let app = TestApp::new();
    let response = app
        .get("/api/v1/auth/me", Some(&app.token_for(Ids::CLIENT_USER)))
        .await;

    response.assert_ok();
    assert_eq!(response.data()["client"]["id"], Ids::CLIENT_CO);
}

#[tokio::test]
async fn test_identity_store_failure_is_500() {
    let app = TestApp::with_store(Arc::new(FailingStore));
    let response = app.get("/api/v1/auth/me", Some(&app.token_for(Ids::ADMIN))).await;
    assert_internal_error(&response);
}

#[tokio::test]
async fn test_identity_readiness_reports_store() {
    let healthy = TestApp::new().get("/ready", None).await;
    healthy.assert_ok();
    assert_eq!(healthy.body["ready"], true);

    let down = TestApp::with_store(Arc::new(FailingStore)).get("/ready", None).await;
    assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Role Gate
// =============================================================================

#[tokio::test]
async fn test_role_admin_only_route() {
    let app = TestApp::new();

    for user in [Ids::OWNER, Ids::MEMBER, Ids::CLIENT_USER] {
        let response = app.get("/api/v1/admin/users", Some(&app.token_for(user))).await;
        assert_error(&response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE");
    }

    let response = app.get("/api/v1/admin/users", Some(&app.token_for(Ids::ADMIN))).await;
    response.assert_ok();
    assert_eq!(response.body["meta"]["total"], 9);
}

#[tokio::test]
async fn test_role_client_excluded_from_workspace_routes() {
    let app = TestApp::new();
    let uri = format!("/api/v1/workspaces/{}", Ids::WORKSPACE);

    let response = app.get(&uri, Some(&app.token_for(Ids::CLIENT_USER))).await;
    assert_error(&response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_role_gate_runs_before_ownership() {
    // A client-role caller on a nonexistent workspace hits the role gate
    // first, so the answer is 403 rather than 404.
    let app = TestApp::new();
    let uri = "/api/v1/workspaces/99999999-9999-4999-8999-999999999999";

    let response = app.get(uri, Some(&app.token_for(Ids::CLIENT_USER))).await;
    assert_error(&response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_role_filter_on_user_list() {
    let app = TestApp::new();
    let token = app.token_for(Ids::ADMIN);

    let response = app.get("/api/v1/admin/users?role=client", Some(&token)).await;
    response.assert_ok();
    assert_eq!(response.body["meta"]["total"], 2);

    let response = app.get("/api/v1/admin/users?role=overlord", Some(&token)).await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_role_create_content_denied_to_clients() {
    let app = TestApp::new();
    let body = serde_json::json!({ "title": "Sneaky" });

    let response = app
        .post_json("/api/v1/content", Some(&app.token_for(Ids::CLIENT_USER)), body.clone())
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE");

    let response = app
        .post_json("/api/v1/content", Some(&app.token_for(Ids::OUTSIDER)), body)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "body: {}", response.body);
    assert_eq!(response.data()["status"], "draft");
    assert_eq!(response.data()["creator_id"], Ids::OUTSIDER);
}

// =============================================================================
// Error shape
// =============================================================================

#[tokio::test]
async fn test_error_body_shape() {
    let app = TestApp::new();
    let response = app.get("/api/v1/auth/me", None).await;

    let body = response.body.as_object().unwrap();
    assert!(body.contains_key("error"));
    assert!(body.contains_key("message"));
    assert!(!body.contains_key("success"));
}

#[tokio::test]
async fn test_error_unknown_route_after_auth() {
    let app = TestApp::new();
    let response = app.get("/api/v1/nope", Some(&app.token_for(Ids::ADMIN))).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}
