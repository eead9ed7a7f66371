// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User administration handlers. Mounted behind an admin-only Role Gate.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use contentflow_core::{Role, UserId, UserStatus};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, IdPath, Pagination, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query string of `GET /api/v1/admin/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    /// Restrict to one role.
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `PATCH /api/v1/admin/users/{user_id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role name.
    pub role: String,
}

/// Body of `PATCH /api/v1/admin/users/{user_id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    /// New account status name.
    pub status: String,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Pagination(page): Pagination,
    Query(query): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let role = match query.role.as_deref() {
        Some(raw) => Some(
            Role::parse(raw)
                .ok_or_else(|| ApiError::validation(format!("Unknown role '{}'", raw)))?,
        ),
        None => None,
    };

    let records = state.records();
    let total = records.count_users(role).await?;
    let users = records.list_users(role, page.offset(), page.limit()).await?;
    let meta = page.meta(total);

    Ok(Json(ApiResponse::success(users).with_meta(meta)))
}

/// PATCH /api/v1/admin/users/{user_id}/role
pub async fn update_user_role(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    IdPath(id): IdPath<UserId>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    if ctx.is(id) {
        return Err(ApiError::forbidden("Cannot change your own role"));
    }
    let role = Role::parse(&request.role)
        .ok_or_else(|| ApiError::validation(format!("Unknown role '{}'", request.role)))?;

    let user = state
        .records()
        .update_user_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(admin_id = %ctx.user_id, user_id = %id, role = %role, "User role changed");

    Ok(Json(ApiResponse::success(user)))
}

/// PATCH /api/v1/admin/users/{user_id}/status
pub async fn update_user_status(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    IdPath(id): IdPath<UserId>,
    ValidatedJson(request): ValidatedJson<UpdateUserStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    if ctx.is(id) {
        return Err(ApiError::forbidden("Cannot change your own status"));
    }
    let status = UserStatus::parse(&request.status).ok_or_else(|| {
        ApiError::validation(format!("Unknown status '{}'", request.status))
    })?;

    let user = state
        .records()
        .update_user_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(
        admin_id = %ctx.user_id,
        user_id = %id,
        status = status.as_str(),
        "User status changed"
    );

    Ok(Json(ApiResponse::success(user)))
}
