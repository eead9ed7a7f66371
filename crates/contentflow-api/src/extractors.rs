// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request extractors. All of them reject with an [`ApiError`] so that
//! malformed input gets the same JSON error body as a gate failure.

use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use contentflow_core::{ClientId, ContentId, UserId, WorkspaceId};
use serde::{Deserialize, de::DeserializeOwned};

use crate::auth::AuthContext;
use crate::error::{ApiError, ValidationErrors};
use crate::response::ResponseMeta;

// =============================================================================
// Caller
// =============================================================================

/// The verified caller, as inserted by the Token Verifier.
///
/// ```rust,ignore
/// async fn whoami(Auth(ctx): Auth) -> String {
///     ctx.user_id.to_string()
/// }
/// ```
pub struct Auth(pub AuthContext);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// JSON body
// =============================================================================

/// JSON body; syntax and type errors become 400 `BAD_REQUEST`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(body)| ValidatedJson(body))
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}

// =============================================================================
// Paging
// =============================================================================

/// Largest page a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// `?page=&per_page=`; 1-indexed, 20 per page by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Page {
    /// Rows to skip.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.limit()
    }

    /// Rows to return.
    pub fn limit(&self) -> usize {
        self.per_page as usize
    }

    /// Pagination metadata for a result set of `total` rows.
    pub fn meta(&self, total: u64) -> ResponseMeta {
        ResponseMeta::pagination(total, self.page, self.per_page)
    }

    fn check(self) -> Result<Self, ApiError> {
        let mut errors = ValidationErrors::new();
        if self.page == 0 {
            errors.add("page", "must be at least 1");
        }
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            errors.add("per_page", format!("must be between 1 and {}", MAX_PER_PAGE));
        }
        errors.into_result(self)
    }
}

/// Extractor for [`Page`]. Out-of-range values are a 422 with field details.
pub struct Pagination(pub Page);

impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(page) = Query::<Page>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        page.check().map(Pagination)
    }
}

// =============================================================================
// Record ids
// =============================================================================

/// An id type that can be named in a URL.
pub trait PathId: FromStr + Send {
    /// Resource name for the not-found message.
    const RESOURCE: &'static str;
}

impl PathId for UserId {
    const RESOURCE: &'static str = "User";
}

impl PathId for WorkspaceId {
    const RESOURCE: &'static str = "Workspace";
}

impl PathId for ClientId {
    const RESOURCE: &'static str = "Client";
}

impl PathId for ContentId {
    const RESOURCE: &'static str = "Content item";
}

/// Parses a path segment. A segment that is not a UUID cannot name a row,
/// so it is reported as 404 rather than 400.
pub fn parse_path_id<T: PathId>(raw: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::not_found(T::RESOURCE))
}

/// Single id from a one-parameter route.
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: PathId,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        parse_path_id(&raw).map(IdPath)
    }
}
