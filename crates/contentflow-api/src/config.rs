// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Runtime settings for [`ApiServer`](crate::ApiServer).
//!
//! The binary fills this from the file-level configuration; tests build it
//! directly with the `with_*` setters.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::auth::JwtConfig;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// ApiConfig
// =============================================================================

/// Settings for the HTTP surface.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the listener binds to.
    pub listen: SocketAddr,
    /// Cross-origin policy.
    pub cors: CorsConfig,
    /// Token verification.
    pub jwt: JwtConfig,
    /// Paths that bypass the Token Verifier (exact, or `prefix*`).
    pub public_paths: Vec<String>,
    /// Per-request deadline.
    pub request_timeout: Duration,
    /// How long in-flight requests may drain on shutdown.
    pub shutdown_timeout: Duration,
    /// Largest accepted request body in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
            public_paths: vec!["/health".into(), "/ready".into()],
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Sets the listen address.
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    /// Sets token verification.
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Sets the cross-origin policy.
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Sets the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Replaces the public path list.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = paths;
        self
    }

    /// Sets the body size limit.
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// Cross-origin policy. `"*"` in `origins` or `headers` means any.
///
/// Credentials are only honoured when neither list is a wildcard; browsers
/// reject the combination anyway.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    /// Allowed origins.
    pub origins: Vec<String>,
    /// Allowed methods.
    pub methods: Vec<String>,
    /// Allowed request headers.
    pub headers: Vec<String>,
    /// Requested credentials support.
    pub credentials: bool,
    /// Preflight cache lifetime.
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec!["*".into()],
            methods: ["GET", "POST", "PATCH", "DELETE", "OPTIONS"]
                .map(String::from)
                .to_vec(),
            headers: ["Content-Type", "Authorization", "X-Request-ID"]
                .map(String::from)
                .to_vec(),
            credentials: false,
            max_age: Duration::from_secs(3600),
        }
    }
}

impl CorsConfig {
    /// Allows exactly the given origins, with credentials.
    pub fn for_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
            credentials: true,
            ..Self::default()
        }
    }

    /// Whether every origin is allowed.
    pub fn any_origin(&self) -> bool {
        self.origins.iter().any(|o| o == "*")
    }

    /// Whether every request header is allowed.
    pub fn any_header(&self) -> bool {
        self.headers.iter().any(|h| h == "*")
    }

    /// Whether `Access-Control-Allow-Credentials` can be sent.
    pub fn sends_credentials(&self) -> bool {
        self.credentials && !self.any_origin() && !self.any_header()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.listen.port(), DEFAULT_PORT);
        assert!(config.listen.ip().is_unspecified());
        assert_eq!(config.public_paths, vec!["/health", "/ready"]);
        assert!(config.cors.any_origin());
    }

    #[test]
    fn test_setters() {
        let config = ApiConfig::default()
            .with_listen(SocketAddr::from(([127, 0, 0, 1], 9000)))
            .with_request_timeout(Duration::from_secs(5))
            .with_max_body_size(1024);
        assert_eq!(config.listen.to_string(), "127.0.0.1:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_body_size, 1024);
    }

    #[test]
    fn test_credentials_need_explicit_origins() {
        assert!(!CorsConfig::default().sends_credentials());

        let cors = CorsConfig::for_origins(["https://app.contentflow.io"]);
        assert!(cors.sends_credentials());

        let wildcard_headers = CorsConfig {
            headers: vec!["*".into()],
            ..cors
        };
        assert!(!wildcard_headers.sends_credentials());
    }
}
