// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token Verifier middleware.
//!
//! Resolves `Authorization: Bearer <jwt>` to an active user record and
//! inserts the resulting [`AuthContext`] into request extensions.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, header},
    response::{IntoResponse, Response},
};
use contentflow_core::Records;
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, JwtManager};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for bearer-token verification.
#[derive(Clone)]
pub struct AuthLayer {
    jwt_manager: Arc<JwtManager>,
    records: Records,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(jwt_manager: Arc<JwtManager>, records: Records) -> Self {
        Self {
            jwt_manager,
            records,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` matches any path with that prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(vec!["/health".to_string(), "/ready".to_string()])
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_manager: self.jwt_manager.clone(),
            records: self.records.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer-token verification.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_manager: Arc<JwtManager>,
    records: Records,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_manager = self.jwt_manager.clone();
        let records = self.records.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            let mut auth_ctx = match authenticate(&jwt_manager, &records, req.headers()).await {
                Ok(ctx) => ctx,
                Err(e) => return Ok(e.into_response()),
            };

            if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
                auth_ctx = auth_ctx.with_client_ip(addr.ip());
            }
            if let Some(request_id) = request_id_header(req.headers()) {
                auth_ctx = auth_ctx.with_request_id(request_id);
            }

            tracing::debug!(
                user_id = %auth_ctx.user_id,
                role = %auth_ctx.role,
                request_id = %auth_ctx.request_id,
                "Request authenticated"
            );

            req.extensions_mut().insert(auth_ctx);
            inner.call(req).await
        })
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Runs the full verification sequence against request headers.
///
/// 1. bearer token present, else `MISSING_TOKEN`
/// 2. signature and expiry, else `INVALID_TOKEN` / `TOKEN_EXPIRED`
/// 3. subject resolves to a user, else `USER_NOT_FOUND`
/// 4. user is active, else `ACCOUNT_INACTIVE`
pub async fn authenticate(
    jwt_manager: &JwtManager,
    records: &Records,
    headers: &HeaderMap,
) -> ApiResult<AuthContext> {
    let token = extract_bearer_token(headers).ok_or(ApiError::MissingToken)?;

    let claims = jwt_manager.validate_token(token)?.claims;
    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::invalid_token("Token subject is not a user id"))?;

    let user = records.user(user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "Token subject has no user record");
        ApiError::UserNotFound
    })?;

    if !user.is_active() {
        tracing::warn!(
            user_id = %user.id,
            status = %user.status,
            "Rejected request from inactive account"
        );
        return Err(ApiError::AccountInactive);
    }

    Ok(AuthContext::from_user(&user))
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn request_id_header(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}

// =============================================================================
// Tests
// =============================================================================
