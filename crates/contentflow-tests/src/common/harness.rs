// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Runs requests through the complete router in-process. No socket is
//! bound; every request is a `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use contentflow_api::auth::{JwtConfig, JwtManager};
use contentflow_api::{ApiConfig, ApiServer, ApiServerBuilder};
use contentflow_core::{Store, UserId};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::fixtures::{Ids, TEST_SECRET, seeded_store};
use super::init_test_logging;

// =============================================================================
// TestApp
// =============================================================================

/// The full API router over a chosen store.
pub struct TestApp {
    router: Router,
    jwt: JwtManager,
}

impl TestApp {
    /// Router over the fixture seed.
    pub fn new() -> Self {
        Self::with_store(Arc::new(seeded_store()))
    }

    /// Router over an arbitrary store.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        init_test_logging();

        let config = ApiConfig::default().with_jwt(test_jwt_config());
        let server: ApiServer = ApiServerBuilder::new()
            .config(config)
            .store(store)
            .build()
            .expect("test server builds");

        Self {
            router: server.router(),
            jwt: server.state().jwt().clone(),
        }
    }

    /// A valid access token for a fixture id.
    pub fn token_for(&self, user: &str) -> String {
        self.jwt
            .create_access_token(Ids::typed::<UserId>(user))
            .expect("token signs")
    }

    /// A correctly signed token that expired an hour ago.
    pub fn expired_token_for(&self, user: &str) -> String {
        self.jwt
            .create_token_with_ttl(Ids::typed::<UserId>(user), -3600)
            .expect("token signs")
    }

    /// GET request.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    /// POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// PATCH request with a JSON body.
    pub async fn patch_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    /// Sends a request with an arbitrary `Authorization` header value.
    pub async fn get_with_authorization(&self, uri: &str, authorization: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .expect("request builds");
        self.dispatch(request).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).expect("request builds"))
            .await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// JWT settings shared by every harness instance.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

// =============================================================================
// TestResponse
// =============================================================================

/// Status and decoded JSON body.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed body, or `Null` when it was not JSON.
    pub body: Value,
}

impl TestResponse {
    /// The `error` field of a failure body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"].as_str()
    }

    /// The `data` field of a success body.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// Asserts a 200 response.
    #[track_caller]
    pub fn assert_ok(&self) -> &Self {
        assert_eq!(self.status, StatusCode::OK, "unexpected body: {}", self.body);
        self
    }
}
