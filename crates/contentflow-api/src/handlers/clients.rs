// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client handlers.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use contentflow_core::{Client, ClientId, UserId, WorkspaceId};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::extractors::{Auth, IdPath, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Body of `POST /api/v1/clients`.
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Workspace to group the client under.
    #[serde(default)]
    pub workspace_id: Option<WorkspaceId>,
    /// Login to link for self-service.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl CreateClientRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be empty");
        }
        if self.email.as_deref().is_some_and(|e| !e.contains('@')) {
            errors.add("email", "must be an email address");
        }
        errors.into_result(())
    }
}

/// GET /api/v1/clients/{client_id}
///
/// Returns the client joined with its workspace.
pub async fn get_client(
    State(state): State<AppState>,
    IdPath(id): IdPath<ClientId>,
) -> ApiResult<impl IntoResponse> {
    let joined = state
        .records()
        .client_with_workspace(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client"))?;

    Ok(Json(ApiResponse::success(joined)))
}

/// POST /api/v1/clients
///
/// Creates a client owned by the caller. Placing it in a workspace requires
/// access to that workspace.
pub async fn create_client(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateClientRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    if let Some(workspace_id) = request.workspace_id {
        state.ownership().check_workspace(&ctx, workspace_id).await?;
    }
    if let Some(user_id) = request.user_id {
        if state.records().user(user_id).await?.is_none() {
            return Err(ApiError::validation("Linked user does not exist"));
        }
    }

    let client = Client {
        id: ClientId::new_random(),
        name: request.name.trim().to_string(),
        creator_id: ctx.user_id,
        user_id: request.user_id,
        workspace_id: request.workspace_id,
        email: request.email,
        created_at: Some(Utc::now()),
    };
    let client = state.records().insert_client(&client).await?;

    tracing::info!(
        client_id = %client.id,
        creator_id = %ctx.user_id,
        "Client created"
    );

    Ok(ApiResponse::created(client))
}
