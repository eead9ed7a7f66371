// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity handlers.

use axum::{Json, extract::State, response::IntoResponse};
use contentflow_core::{Client, Role, User};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// The caller's own profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    /// The user record.
    pub user: User,
    /// The client record linked to this login, for client accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
}

/// GET /api/v1/auth/me
///
/// Returns the authenticated user's record.
pub async fn current_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .records()
        .user(ctx.user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let client = match user.role {
        Role::Client => state.records().client_for_user(user.id).await?,
        _ => None,
    };

    Ok(Json(ApiResponse::success(MeResponse { user, client })))
}
