// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
///
/// Liveness only; never touches the store.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// 503 until the store answers a ping.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    let name = format!("store:{}", store.name());
    let component = match store.ping().await {
        Ok(()) => ComponentStatus::healthy(name),
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "Store not reachable");
            ComponentStatus::unhealthy(name, "unreachable")
        }
    };

    let status = if component.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadinessResponse {
        ready: component.healthy,
        components: vec![component],
    };
    (status, Json(body))
}
