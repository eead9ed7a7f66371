// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role Gate middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use contentflow_core::Role;
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// RoleLayer
// =============================================================================

/// Layer admitting only callers whose role is in a fixed allow-list.
///
/// Membership is exact. Roles have no ordering, so `admin` passes only when
/// it is listed.
#[derive(Debug, Clone)]
pub struct RoleLayer {
    allowed: Arc<Vec<Role>>,
}

impl RoleLayer {
    /// Creates a layer admitting the given roles.
    pub fn allow(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: Arc::new(roles.into_iter().collect()),
        }
    }

    /// Creates a layer admitting a single role.
    pub fn only(role: Role) -> Self {
        Self::allow([role])
    }

    /// Returns the allow-list.
    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = RoleMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleMiddleware {
            inner,
            allowed: self.allowed.clone(),
        }
    }
}

// =============================================================================
// RoleMiddleware
// =============================================================================

/// Middleware for role enforcement.
#[derive(Clone)]
pub struct RoleMiddleware<S> {
    inner: S,
    allowed: Arc<Vec<Role>>,
}

impl<S> Service<Request<Body>> for RoleMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let allowed = self.allowed.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(ctx) = req.extensions().get::<AuthContext>() else {
                tracing::warn!("No auth context found, denying access");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            if !ctx.has_any_role(&allowed) {
                tracing::warn!(
                    user_id = %ctx.user_id,
                    role = %ctx.role,
                    allowed = ?allowed.as_slice(),
                    "Role not permitted"
                );
                return Ok(ApiError::insufficient_role(ctx.role.as_str()).into_response());
            }

            inner.call(req).await
        })
    }
}

// =============================================================================
// Macro
// =============================================================================

/// Builds a [`RoleLayer`] from role names.
///
/// ```
/// use contentflow_api::require_role;
///
/// let layer = require_role!(Admin, Agency);
/// assert_eq!(layer.allowed().len(), 2);
/// ```
#[macro_export]
macro_rules! require_role {
    ($($role:ident),+ $(,)?) => {
        $crate::middleware::RoleLayer::allow([$($crate::Role::$role),+])
    };
}

// =============================================================================
// Tests
// =============================================================================
