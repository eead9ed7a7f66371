// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Ownership Gate
//!
//! - `test_workspace_*`: owner, members, unknown ids
//! - `test_client_*`: linked logins and the workspace-owner rule
//! - `test_admin_*`: bypass and user administration
//! - `test_content_*`: content chain, listing scope and lifecycle

use std::sync::Arc;

use axum::http::StatusCode;
use contentflow_core::{MemoryStore, tables};
use contentflow_tests::prelude::*;
use serde_json::json;

const MISSING: &str = "99999999-9999-4999-8999-999999999999";

fn workspace_uri(id: &str) -> String {
    format!("/api/v1/workspaces/{}", id)
}

fn client_uri(id: &str) -> String {
    format!("/api/v1/clients/{}", id)
}

fn content_uri(id: &str) -> String {
    format!("/api/v1/content/{}", id)
}

// =============================================================================
// Workspace
// =============================================================================

#[tokio::test]
async fn test_workspace_owner_passes() {
    // Creator U1 owns the workspace and calls as U1.
    let app = TestApp::new();
    let response = app
        .get(&workspace_uri(Ids::WORKSPACE), Some(&app.token_for(Ids::OWNER)))
        .await;

    response.assert_ok();
    assert_eq!(response.data()["name"], "Northwind Studio");
}

#[tokio::test]
async fn test_workspace_active_member_passes() {
    let app = TestApp::new();
    let token = app.token_for(Ids::MEMBER);

    app.get(&workspace_uri(Ids::WORKSPACE), Some(&token))
        .await
        .assert_ok();

    let members = app
        .get(&format!("{}/members", workspace_uri(Ids::WORKSPACE)), Some(&token))
        .await;
    members.assert_ok();
    assert_eq!(members.data().as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_workspace_non_member_denied() {
    let app = TestApp::new();

    for user in [Ids::OUTSIDER, Ids::INVITED] {
        let response = app
            .get(&workspace_uri(Ids::WORKSPACE), Some(&app.token_for(user)))
            .await;
        assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");
    }
}

#[tokio::test]
async fn test_workspace_member_with_stale_rows_passes() {
    // A removed membership is stored ahead of the member's active one.
    let store = MemoryStore::from_seed(json!({
        "workspace_members": [
            { "workspace_id": Ids::WORKSPACE, "user_id": Ids::MEMBER, "status": "removed" },
        ],
    }))
    .unwrap();
    store.load_seed(seed()).unwrap();

    let app = TestApp::with_store(Arc::new(store));
    app.get(&workspace_uri(Ids::WORKSPACE), Some(&app.token_for(Ids::MEMBER)))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_workspace_unknown_is_404_before_comparison() {
    let app = TestApp::new();
    let token = app.token_for(Ids::OUTSIDER);

    let response = app.get(&workspace_uri(MISSING), Some(&token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");

    let response = app.get(&workspace_uri("not-a-uuid"), Some(&token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");

    // Undecodable segments are rejected by the gate, not the handler.
    let response = app.get(&workspace_uri("%FF"), Some(&token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");

    let response = app.get(&client_uri("%FF"), Some(&token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_workspace_nested_client_needs_both_checks() {
    let app = TestApp::new();
    let uri = format!(
        "{}/clients/{}",
        workspace_uri(Ids::WORKSPACE),
        Ids::CLIENT_CO
    );

    let response = app.get(&uri, Some(&app.token_for(Ids::OWNER))).await;
    response.assert_ok();
    assert_eq!(response.data()["workspace"]["id"], Ids::WORKSPACE);

    // Members pass the workspace check but not the client check, which only
    // honours the workspace owner.
    let response = app.get(&uri, Some(&app.token_for(Ids::MEMBER))).await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");
}

#[tokio::test]
async fn test_workspace_nested_client_from_other_workspace() {
    let app = TestApp::new();
    let uri = format!(
        "{}/clients/{}",
        workspace_uri(Ids::WORKSPACE),
        Ids::LOOSE_CLIENT
    );

    // Admin gets through the gates, but the client is not in this workspace.
    let response = app.get(&uri, Some(&app.token_for(Ids::ADMIN))).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn test_client_linked_login_passes() {
    let app = TestApp::new();
    let response = app
        .get(&client_uri(Ids::CLIENT_CO), Some(&app.token_for(Ids::CLIENT_USER)))
        .await;

    response.assert_ok();
    assert_eq!(response.data()["name"], "Acme Coffee");
}

#[tokio::test]
async fn test_client_unlinked_login_denied() {
    // Client record linked to U2, caller is U3 with role client.
    let app = TestApp::new();
    let response = app
        .get(
            &client_uri(Ids::CLIENT_CO),
            Some(&app.token_for(Ids::OTHER_CLIENT_USER)),
        )
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");
}

#[tokio::test]
async fn test_client_workspace_owner_passes() {
    let app = TestApp::new();
    app.get(&client_uri(Ids::CLIENT_CO), Some(&app.token_for(Ids::OWNER)))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_client_creator_is_not_consulted() {
    let app = TestApp::new();

    // OUTSIDER created CLIENT_CO but does not own its workspace.
    let response = app
        .get(&client_uri(Ids::CLIENT_CO), Some(&app.token_for(Ids::OUTSIDER)))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");

    // OWNER created LOOSE_CLIENT, which has no workspace at all.
    let response = app
        .get(&client_uri(Ids::LOOSE_CLIENT), Some(&app.token_for(Ids::OWNER)))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");
}

#[tokio::test]
async fn test_client_unknown_is_404() {
    let app = TestApp::new();
    let response = app
        .get(&client_uri(MISSING), Some(&app.token_for(Ids::CLIENT_USER)))
        .await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_client_create_in_workspace() {
    let app = TestApp::new();
    let body = json!({ "name": "Blue Bottle", "workspace_id": Ids::WORKSPACE });

    let response = app
        .post_json("/api/v1/clients", Some(&app.token_for(Ids::OUTSIDER)), body.clone())
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");

    let response = app
        .post_json("/api/v1/clients", Some(&app.token_for(Ids::MEMBER)), body)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "body: {}", response.body);
    assert_eq!(response.data()["creator_id"], Ids::MEMBER);

    let response = app
        .post_json(
            "/api/v1/clients",
            Some(&app.token_for(Ids::MEMBER)),
            json!({ "name": "  " }),
        )
        .await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_bypasses_ownership() {
    let app = TestApp::new();
    let token = app.token_for(Ids::ADMIN);

    app.get(&workspace_uri(Ids::WORKSPACE), Some(&token))
        .await
        .assert_ok();
    app.get(&client_uri(Ids::LOOSE_CLIENT), Some(&token))
        .await
        .assert_ok();
    app.get(&content_uri(Ids::OUTSIDER_ITEM), Some(&token))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_admin_bypass_skips_ownership_lookups() {
    let store = Arc::new(CountingStore::new(Arc::new(seeded_store())));
    let app = TestApp::with_store(store.clone());

    app.get(&workspace_uri(Ids::WORKSPACE), Some(&app.token_for(Ids::ADMIN)))
        .await
        .assert_ok();

    // Only the handler's own read; the gate never looked.
    assert_eq!(store.reads(tables::WORKSPACES), 1);
    assert_eq!(store.reads(tables::WORKSPACE_MEMBERS), 0);
}

#[tokio::test]
async fn test_admin_cannot_change_self() {
    let app = TestApp::new();
    let token = app.token_for(Ids::ADMIN);
    let uri = format!("/api/v1/admin/users/{}", Ids::ADMIN);

    let response = app
        .patch_json(&format!("{}/role", uri), Some(&token), json!({ "role": "creator" }))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");

    let response = app
        .patch_json(&format!("{}/status", uri), Some(&token), json!({ "status": "inactive" }))
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_role_change_takes_effect_immediately() {
    let app = TestApp::new();
    let admin = app.token_for(Ids::ADMIN);
    let owner = app.token_for(Ids::OWNER);

    let response = app
        .patch_json(
            &format!("/api/v1/admin/users/{}/role", Ids::OWNER),
            Some(&admin),
            json!({ "role": "client" }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.data()["role"], "client");

    // Same token, new role: the record wins over anything cached.
    let response = app.get(&workspace_uri(Ids::WORKSPACE), Some(&owner)).await;
    assert_error(&response, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_admin_suspension_blocks_existing_tokens() {
    let app = TestApp::new();
    let outsider = app.token_for(Ids::OUTSIDER);

    app.get("/api/v1/auth/me", Some(&outsider)).await.assert_ok();

    app.patch_json(
        &format!("/api/v1/admin/users/{}/status", Ids::OUTSIDER),
        Some(&app.token_for(Ids::ADMIN)),
        json!({ "status": "suspended" }),
    )
    .await
    .assert_ok();

    let response = app.get("/api/v1/auth/me", Some(&outsider)).await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_admin_update_errors() {
    let app = TestApp::new();
    let token = app.token_for(Ids::ADMIN);

    let response = app
        .patch_json(
            &format!("/api/v1/admin/users/{}/role", MISSING),
            Some(&token),
            json!({ "role": "agency" }),
        )
        .await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");

    let response = app
        .patch_json(
            &format!("/api/v1/admin/users/{}/role", Ids::OWNER),
            Some(&token),
            json!({ "role": "superuser" }),
        )
        .await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admin_user_paging() {
    let app = TestApp::new();
    let token = app.token_for(Ids::ADMIN);

    let response = app
        .get("/api/v1/admin/users?page=2&per_page=4", Some(&token))
        .await;
    response.assert_ok();
    assert_eq!(response.data().as_array().map(Vec::len), Some(4));
    assert_eq!(response.body["meta"]["total"], 9);
    assert_eq!(response.body["meta"]["total_pages"], 3);

    let response = app
        .get("/api/v1/admin/users?per_page=500", Some(&token))
        .await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    assert_eq!(response.body["details"]["fields"][0]["field"], "per_page");
}

// =============================================================================
// Content
// =============================================================================

#[tokio::test]
async fn test_content_list_scope() {
    let app = TestApp::new();

    let own = app.get("/api/v1/content", Some(&app.token_for(Ids::OWNER))).await;
    assert_ids(&own, &[Ids::REVIEW_ITEM, Ids::DRAFT_ITEM]);

    let client = app
        .get("/api/v1/content", Some(&app.token_for(Ids::CLIENT_USER)))
        .await;
    assert_ids(&client, &[Ids::REVIEW_ITEM, Ids::DRAFT_ITEM]);

    let unlinked = app
        .get("/api/v1/content", Some(&app.token_for(Ids::OTHER_CLIENT_USER)))
        .await;
    assert_ids(&unlinked, &[]);
    assert_eq!(unlinked.body["meta"]["total"], 0);

    let admin = app.get("/api/v1/content", Some(&app.token_for(Ids::ADMIN))).await;
    assert_ids(&admin, &[Ids::OUTSIDER_ITEM, Ids::REVIEW_ITEM, Ids::DRAFT_ITEM]);

    let filtered = app
        .get("/api/v1/content?status=review", Some(&app.token_for(Ids::OWNER)))
        .await;
    assert_ids(&filtered, &[Ids::REVIEW_ITEM]);
}

#[tokio::test]
async fn test_content_item_chain() {
    let app = TestApp::new();
    let uri = content_uri(Ids::DRAFT_ITEM);

    app.get(&uri, Some(&app.token_for(Ids::OWNER))).await.assert_ok();
    app.get(&uri, Some(&app.token_for(Ids::CLIENT_USER)))
        .await
        .assert_ok();

    for user in [Ids::OUTSIDER, Ids::OTHER_CLIENT_USER, Ids::MEMBER] {
        let response = app.get(&uri, Some(&app.token_for(user))).await;
        assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");
    }

    let token = app.token_for(Ids::OWNER);
    let response = app.get(&content_uri(MISSING), Some(&token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
    let response = app.get(&content_uri("42"), Some(&token)).await;
    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_content_lifecycle() {
    let app = TestApp::new();
    let owner = app.token_for(Ids::OWNER);
    let status_uri = format!("{}/status", content_uri(Ids::DRAFT_ITEM));

    let response = app
        .patch_json(&status_uri, Some(&owner), json!({ "status": "published" }))
        .await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");

    let response = app
        .patch_json(&status_uri, Some(&owner), json!({ "status": "review" }))
        .await;
    response.assert_ok();
    assert_eq!(response.data()["status"], "review");

    let response = app
        .patch_json(&status_uri, Some(&owner), json!({ "status": "approved" }))
        .await;
    response.assert_ok();

    let response = app
        .patch_json(&status_uri, Some(&owner), json!({ "status": "scheduled" }))
        .await;
    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    assert_eq!(response.body["details"]["fields"][0]["field"], "scheduled_at");

    let response = app
        .patch_json(
            &status_uri,
            Some(&owner),
            json!({ "status": "scheduled", "scheduled_at": "2030-01-01T09:00:00Z" }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.data()["status"], "scheduled");
    assert!(response.data()["scheduled_at"].is_string());

    let response = app
        .patch_json(&status_uri, Some(&owner), json!({ "status": "published" }))
        .await;
    response.assert_ok();
    assert!(response.data()["published_at"].is_string());
}

#[tokio::test]
async fn test_content_client_review_decisions() {
    let app = TestApp::new();
    let client = app.token_for(Ids::CLIENT_USER);

    let response = app
        .patch_json(
            &format!("{}/status", content_uri(Ids::REVIEW_ITEM)),
            Some(&client),
            json!({ "status": "approved" }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.data()["status"], "approved");

    let response = app
        .patch_json(
            &format!("{}/status", content_uri(Ids::DRAFT_ITEM)),
            Some(&client),
            json!({ "status": "review" }),
        )
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "FORBIDDEN");
}

#[tokio::test]
async fn test_content_create_for_foreign_client() {
    let app = TestApp::new();
    let body = json!({ "title": "Pitch", "client_id": Ids::LOOSE_CLIENT });

    let response = app
        .post_json("/api/v1/content", Some(&app.token_for(Ids::OUTSIDER)), body.clone())
        .await;
    assert_error(&response, StatusCode::FORBIDDEN, "ACCESS_DENIED");

    let response = app
        .post_json("/api/v1/content", Some(&app.token_for(Ids::OWNER)), body)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "body: {}", response.body);
    assert_eq!(response.data()["client_id"], Ids::LOOSE_CLIENT);
}
