// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ownership Gate middleware.
//!
//! Reads workspace and client identifiers from the matched route and runs
//! them through an [`OwnershipGuard`]. Must be installed with
//! `Router::route_layer` so that path parameters are already resolved.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::{FromRequestParts, RawPathParams},
    http::Request,
    response::{IntoResponse, Response},
};
use contentflow_core::Records;
use tower::{Layer, Service};

use crate::auth::{AuthContext, OwnershipGuard, OwnershipTarget};
use crate::error::{ApiError, ApiResult};

/// Default path parameter carrying a workspace id.
pub const WORKSPACE_PARAM: &str = "workspace_id";

/// Default path parameter carrying a client id.
pub const CLIENT_PARAM: &str = "client_id";

// =============================================================================
// OwnershipLayer
// =============================================================================

/// Layer enforcing workspace and client ownership.
#[derive(Debug, Clone)]
pub struct OwnershipLayer {
    guard: OwnershipGuard,
    params: Arc<ParamNames>,
}

#[derive(Debug)]
struct ParamNames {
    workspace: String,
    client: String,
}

impl OwnershipLayer {
    /// Creates a layer reading `workspace_id` and `client_id`.
    pub fn new(records: Records) -> Self {
        Self {
            guard: OwnershipGuard::new(records),
            params: Arc::new(ParamNames {
                workspace: WORKSPACE_PARAM.to_string(),
                client: CLIENT_PARAM.to_string(),
            }),
        }
    }

    /// Overrides the path parameter names.
    pub fn with_param_names(
        mut self,
        workspace: impl Into<String>,
        client: impl Into<String>,
    ) -> Self {
        self.params = Arc::new(ParamNames {
            workspace: workspace.into(),
            client: client.into(),
        });
        self
    }
}

impl<S> Layer<S> for OwnershipLayer {
    type Service = OwnershipMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OwnershipMiddleware {
            inner,
            guard: self.guard.clone(),
            params: self.params.clone(),
        }
    }
}

// =============================================================================
// OwnershipMiddleware
// =============================================================================

/// Middleware for ownership enforcement.
#[derive(Clone)]
pub struct OwnershipMiddleware<S> {
    inner: S,
    guard: OwnershipGuard,
    params: Arc<ParamNames>,
}

impl<S> Service<Request<Body>> for OwnershipMiddleware<S>
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
        let guard = self.guard.clone();
        let params = self.params.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let Some(ctx) = parts.extensions.get::<AuthContext>().cloned() else {
                tracing::warn!("No auth context found, denying access");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            // A path that cannot be decoded names no row, so it is treated
            // like any other unknown id.
            let target = match RawPathParams::from_request_parts(&mut parts, &()).await {
                Ok(raw) => target_from(&raw, &params),
                Err(rejection) => {
                    tracing::debug!(reason = %rejection.body_text(), "Unreadable path parameters");
                    Err(ApiError::not_found("Resource"))
                }
            };

            let checked = match target {
                Ok(target) => guard.check(&ctx, &target).await,
                Err(e) => Err(e),
            };
            if let Err(e) = checked {
                return Ok(e.into_response());
            }

            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

fn target_from(raw: &RawPathParams, names: &ParamNames) -> ApiResult<OwnershipTarget> {
    let mut workspace = None;
    let mut client = None;
    for (key, value) in raw.iter() {
        if key == names.workspace {
            workspace = Some(value);
        } else if key == names.client {
            client = Some(value);
        }
    }
    OwnershipTarget::from_raw(workspace, client)
}

// =============================================================================
// Tests
// =============================================================================
