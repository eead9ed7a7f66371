// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.
//!
//! The Token Verifier runs on every non-public path. Role and Ownership
//! Gates are attached per route group with `route_layer`, role outermost,
//! so the order is always verify, role, ownership.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    routing::{get, patch, post},
};
use contentflow_core::Store;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::JwtManager;
use crate::config::{ApiConfig, CorsConfig};
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, OwnershipLayer};
use crate::require_role;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let records = self.state.records.clone();

        let auth = AuthLayer::new(self.state.jwt_manager.clone(), records.clone())
            .with_public_paths(self.config.public_paths.clone());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_timeout_layer(self.config.request_timeout))
            .layer(create_cors_layer(&self.config.cors))
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(auth);

        // Workspace routes: role, then ownership of every id in the path.
        let workspaces = Router::new()
            .route(
                "/api/v1/workspaces/{workspace_id}",
                get(handlers::get_workspace),
            )
            .route(
                "/api/v1/workspaces/{workspace_id}/members",
                get(handlers::list_workspace_members),
            )
            .route(
                "/api/v1/workspaces/{workspace_id}/clients/{client_id}",
                get(handlers::get_workspace_client),
            )
            .route_layer(OwnershipLayer::new(records.clone()))
            .route_layer(require_role!(Admin, Agency, Creator));

        let clients = Router::new()
            .route("/api/v1/clients/{client_id}", get(handlers::get_client))
            .route_layer(OwnershipLayer::new(records))
            .route(
                "/api/v1/clients",
                post(handlers::create_client).route_layer(require_role!(Admin, Agency, Creator)),
            );

        let content = Router::new()
            .route(
                "/api/v1/content",
                get(handlers::list_content).merge(
                    post(handlers::create_content)
                        .route_layer(require_role!(Admin, Agency, Creator)),
                ),
            )
            .route("/api/v1/content/{content_id}", get(handlers::get_content))
            .route(
                "/api/v1/content/{content_id}/status",
                patch(handlers::update_content_status),
            );

        let admin = Router::new()
            .route("/api/v1/admin/users", get(handlers::list_users))
            .route(
                "/api/v1/admin/users/{user_id}/role",
                patch(handlers::update_user_role),
            )
            .route(
                "/api/v1/admin/users/{user_id}/status",
                patch(handlers::update_user_status),
            )
            .route_layer(require_role!(Admin));

        Router::new()
            // Health endpoints (public)
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Auth endpoints
            .route("/api/v1/auth/me", get(handlers::current_user))
            .merge(workspaces)
            .merge(clients)
            .merge(content)
            .merge(admin)
            .fallback(route_not_found)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.listen;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        info!(
            %addr,
            store = self.state.store().name(),
            "Starting API server"
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.listen
    }
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Requests running past `timeout` are answered with 408.
fn create_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Creates the CORS layer from configuration.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origin = if cors.any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    let methods: Vec<Method> = cors.methods.iter().filter_map(|m| m.parse().ok()).collect();

    let headers = if cors.any_header() {
        AllowHeaders::any()
    } else {
        let parsed: Vec<HeaderName> = cors.headers.iter().filter_map(|h| h.parse().ok()).collect();
        if parsed.is_empty() {
            AllowHeaders::list([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        } else {
            AllowHeaders::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(cors.sends_credentials())
        .max_age(cors.max_age)
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the JWT manager.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.state_builder = self.state_builder.jwt_manager(manager);
        self
    }

    /// Sets the persistence collaborator.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.state_builder = self.state_builder.store(store);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
