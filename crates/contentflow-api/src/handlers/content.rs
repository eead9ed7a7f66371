// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Content handlers.
//!
//! Item routes carry no workspace or client id, so the ownership chain is
//! checked here once the item is loaded.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use contentflow_core::{ClientId, ContentFilter, ContentId, ContentItem, ContentStatus, Role};
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::extractors::{Auth, IdPath, Pagination, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

const MAX_TITLE_LEN: usize = 200;

// =============================================================================
// Request Types
// =============================================================================

/// Query string of `GET /api/v1/content`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    /// Restrict to one lifecycle state.
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /api/v1/content`.
#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    /// Title.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
    /// Target platform.
    #[serde(default)]
    pub platform: Option<String>,
    /// Client the item is produced for.
    #[serde(default)]
    pub client_id: Option<ClientId>,
}

impl CreateContentRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut errors = ValidationErrors::new();
        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", "must not be empty");
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.add("title", format!("must be at most {} characters", MAX_TITLE_LEN));
        }
        errors.into_result(())
    }
}

/// Body of `PATCH /api/v1/content/{content_id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target state name.
    pub status: String,
    /// Publication time, required when scheduling.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/v1/content
///
/// Admins see everything. Client logins see the items produced for their
/// client record. Everyone else sees what they created.
pub async fn list_content(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Pagination(page): Pagination,
    Query(query): Query<ContentQuery>,
) -> ApiResult<impl IntoResponse> {
    let mut filter = ContentFilter::default();
    if let Some(raw) = query.status.as_deref() {
        let status = ContentStatus::parse(raw)
            .ok_or_else(|| ApiError::validation(format!("Unknown status '{}'", raw)))?;
        filter = filter.status(status);
    }

    filter = match ctx.role {
        Role::Admin => filter,
        Role::Client => match state.records().client_for_user(ctx.user_id).await? {
            Some(client) => filter.client(client.id),
            None => {
                let meta = page.meta(0);
                return Ok(Json(
                    ApiResponse::success(Vec::<ContentItem>::new()).with_meta(meta),
                ));
            }
        },
        _ => filter.creator(ctx.user_id),
    };

    let records = state.records();
    let total = records.count_content(&filter).await?;
    let items = records
        .list_content(&filter, page.offset(), page.limit())
        .await?;
    let meta = page.meta(total);

    Ok(Json(ApiResponse::success(items).with_meta(meta)))
}

/// POST /api/v1/content
///
/// Starts a draft owned by the caller. Attaching a client requires having
/// created that client or owning its workspace.
pub async fn create_content(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateContentRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate()?;

    if let Some(client_id) = request.client_id {
        check_attachable(&state, &ctx, client_id).await?;
    }

    let now = Utc::now();
    let item = ContentItem {
        id: ContentId::new_random(),
        title: request.title.trim().to_string(),
        body: request.body,
        platform: request.platform,
        creator_id: ctx.user_id,
        client_id: request.client_id,
        status: ContentStatus::Draft,
        scheduled_at: None,
        published_at: None,
        created_at: Some(now),
        updated_at: Some(now),
    };
    let item = state.records().insert_content(&item).await?;

    tracing::info!(content_id = %item.id, creator_id = %ctx.user_id, "Content created");

    Ok(ApiResponse::created(item))
}

/// GET /api/v1/content/{content_id}
pub async fn get_content(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    IdPath(id): IdPath<ContentId>,
) -> ApiResult<impl IntoResponse> {
    let item = load_content(&state, id).await?;
    state.ownership().check_content(&ctx, &item).await?;

    Ok(Json(ApiResponse::success(item)))
}

/// PATCH /api/v1/content/{content_id}/status
///
/// Moves an item along its lifecycle. Client logins may only decide on
/// items waiting for review.
pub async fn update_content_status(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    IdPath(id): IdPath<ContentId>,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let item = load_content(&state, id).await?;
    state.ownership().check_content(&ctx, &item).await?;

    let next = ContentStatus::parse(&request.status).ok_or_else(|| {
        ApiError::validation(format!("Unknown status '{}'", request.status))
    })?;

    if ctx.role == Role::Client
        && !matches!(next, ContentStatus::Approved | ContentStatus::Rejected)
    {
        return Err(ApiError::forbidden(
            "Clients may only approve or reject content",
        ));
    }

    if !item.status.can_transition_to(next) {
        return Err(ApiError::validation(format!(
            "Cannot move content from {} to {}",
            item.status, next
        )));
    }

    let scheduled_at = match (next, request.scheduled_at) {
        (ContentStatus::Scheduled, None) => {
            let mut errors = ValidationErrors::new();
            errors.add("scheduled_at", "is required when scheduling");
            return Err(ApiError::validation_with_errors("Validation failed", errors));
        }
        (ContentStatus::Scheduled, Some(at)) => Some(at),
        _ => None,
    };

    let updated = state
        .records()
        .update_content_status(id, next, scheduled_at)
        .await?
        .ok_or_else(|| ApiError::not_found("Content item"))?;

    tracing::info!(
        content_id = %id,
        user_id = %ctx.user_id,
        from = %item.status,
        to = %next,
        "Content status changed"
    );

    Ok(Json(ApiResponse::success(updated)))
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_content(state: &AppState, id: ContentId) -> ApiResult<ContentItem> {
    state
        .records()
        .content(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content item"))
}

async fn check_attachable(state: &AppState, ctx: &AuthContext, id: ClientId) -> ApiResult<()> {
    let joined = state
        .records()
        .client_with_workspace(id)
        .await?
        .ok_or_else(|| ApiError::validation("Client does not exist"))?;

    if ctx.is_admin()
        || ctx.is(joined.client.creator_id)
        || joined.workspace_owner() == Some(ctx.user_id)
    {
        return Ok(());
    }

    Err(ApiError::access_denied(
        "You do not have access to this client",
    ))
}
