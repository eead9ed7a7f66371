// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Workspace handlers.
//!
//! Every route here sits behind the Ownership Gate, so handlers only load
//! and shape records.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use contentflow_core::{ClientId, WorkspaceId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{IdPath, parse_path_id};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/workspaces/{workspace_id}
pub async fn get_workspace(
    State(state): State<AppState>,
    IdPath(id): IdPath<WorkspaceId>,
) -> ApiResult<impl IntoResponse> {
    let workspace = state
        .records()
        .workspace(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Workspace"))?;

    Ok(Json(ApiResponse::success(workspace)))
}

/// GET /api/v1/workspaces/{workspace_id}/members
pub async fn list_workspace_members(
    State(state): State<AppState>,
    IdPath(id): IdPath<WorkspaceId>,
) -> ApiResult<impl IntoResponse> {
    if state.records().workspace(id).await?.is_none() {
        return Err(ApiError::not_found("Workspace"));
    }
    let members = state.records().workspace_members(id).await?;

    Ok(Json(ApiResponse::success(members)))
}

/// GET /api/v1/workspaces/{workspace_id}/clients/{client_id}
///
/// A client that exists but belongs to another workspace is reported as not
/// found under this one.
pub async fn get_workspace_client(
    State(state): State<AppState>,
    Path((workspace_id, client_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let workspace_id: WorkspaceId = parse_path_id(&workspace_id)?;
    let client_id: ClientId = parse_path_id(&client_id)?;

    let joined = state
        .records()
        .client_with_workspace(client_id)
        .await?
        .filter(|joined| joined.client.workspace_id == Some(workspace_id))
        .ok_or_else(|| ApiError::not_found("Client"))?;

    Ok(Json(ApiResponse::success(joined)))
}
