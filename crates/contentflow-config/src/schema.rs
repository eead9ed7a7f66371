// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for ContentFlow.
//!
//! # Schema Structure
//!
//! ```text
//! ContentFlowConfig
//! ├── api: ApiConfig
//! ├── jwt: JwtConfig
//! ├── store: StoreConfig
//! └── logging: LoggingConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default JWT expiration in seconds (1 hour).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 3600;

/// Default allowed clock skew in seconds. Expired tokens are rejected
/// immediately unless a leeway is configured.
pub const DEFAULT_JWT_LEEWAY_SECS: u64 = 0;

/// Default store request timeout in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Minimum JWT secret length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for ContentFlow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentFlowConfig {
    /// API server configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Token verification configuration.
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Persistence configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ContentFlowConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.jwt.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

// =============================================================================
// API Configuration
// =============================================================================

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// Listen port.
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024
}

impl ApiConfig {
    /// Validates the API configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::invalid("api.port", "cannot be zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.request_timeout_secs",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::invalid("api.max_body_size", "cannot be zero"));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_API_PORT,
            cors: CorsConfig::default(),
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (use "*" for all).
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allowed methods.
    #[serde(default = "default_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed headers.
    #[serde(default = "default_headers")]
    pub allowed_headers: Vec<String>,

    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Max age in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PATCH", "DELETE"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_headers() -> Vec<String> {
    vec!["Content-Type".to_string(), "Authorization".to_string()]
}

fn default_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: default_methods(),
            allowed_headers: default_headers(),
            allow_credentials: false,
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// JWT Configuration
// =============================================================================

/// Token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,

    /// Expected audience, if any.
    #[serde(default)]
    pub audience: Option<String>,

    /// Lifetime of issued tokens in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: u64,

    /// Allowed clock skew in seconds.
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,

    /// Paths that bypass token verification (exact, or prefix with trailing `*`).
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_jwt_issuer() -> String {
    "contentflow".to_string()
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

fn default_jwt_leeway() -> u64 {
    DEFAULT_JWT_LEEWAY_SECS
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string(), "/ready".to_string()]
}

impl JwtConfig {
    /// Validates the JWT configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let Some(secret) = &self.secret else {
            return Err(ConfigError::missing("jwt.secret"));
        };
        if secret.raw().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::invalid(
                "jwt.secret",
                format!("must be at least {} bytes", MIN_JWT_SECRET_LEN),
            ));
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::invalid(
                "jwt.expiration_secs",
                "cannot be zero",
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::invalid("jwt.issuer", "cannot be empty"));
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: default_jwt_issuer(),
            audience: None,
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            leeway_secs: DEFAULT_JWT_LEEWAY_SECS,
            public_paths: default_public_paths(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Persistence backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process tables, optionally seeded from a JSON file.
    #[default]
    Memory,
    /// PostgREST-compatible HTTP endpoint.
    Rest,
}

impl StoreBackend {
    /// Returns the backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Rest => "rest",
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base URL of the REST endpoint.
    #[serde(default)]
    pub url: Option<String>,

    /// Service key for the REST endpoint.
    #[serde(default)]
    pub service_key: Option<SecretValue>,

    /// Database schema.
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Request timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,

    /// JSON seed document for the memory backend.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_store_timeout() -> u64 {
    DEFAULT_STORE_TIMEOUT_SECS
}

impl StoreConfig {
    /// Validates the store configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StoreBackend::Rest {
            match self.url.as_deref() {
                None | Some("") => return Err(ConfigError::missing("store.url")),
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    return Err(ConfigError::invalid(
                        "store.url",
                        "must start with http:// or https://",
                    ));
                }
                Some(_) => {}
            }
            if self.service_key.as_ref().is_none_or(|k| k.raw().is_empty()) {
                return Err(ConfigError::missing("store.service_key"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("store.timeout_secs", "cannot be zero"));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            service_key: None,
            schema: default_schema(),
            timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
            seed_path: None,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    #[serde(alias = "pretty")]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON for log aggregation.
    Json,
}

impl LogFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never prints its value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretValue").field(&"***").finish()
    }
}
