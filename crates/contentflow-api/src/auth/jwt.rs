// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.

use std::sync::Arc;
use std::time::Duration;

use contentflow_core::UserId;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use super::Claims;
use crate::error::{ApiError, ApiResult};

/// Signing algorithm. Tokens are shared-secret HMAC only.
const ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience. Audience is only checked when set.
    pub audience: Option<String>,
    /// Token expiration time in seconds.
    pub expiration_secs: i64,
    /// Clock skew tolerance in seconds. Zero rejects a token as soon as it
    /// is past `exp`.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "contentflow".to_string(),
            audience: None,
            expiration_secs: 3600,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets the expiration time.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs() as i64;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_secs", &self.expiration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Manager for JWT token operations.
///
/// Decoding distinguishes an expired signature ([`ApiError::TokenExpired`])
/// from every other failure ([`ApiError::InvalidToken`]).
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = config.leeway_secs;

        match config.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs the given claims.
    pub fn create_token(&self, claims: &Claims) -> ApiResult<String> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {}", e)))
    }

    /// Creates a new access token for a user with the configured lifetime.
    pub fn create_access_token(&self, user_id: UserId) -> ApiResult<String> {
        self.create_token_with_ttl(user_id, self.config.expiration_secs)
    }

    /// Creates a new access token for a user with an explicit lifetime.
    pub fn create_token_with_ttl(&self, user_id: UserId, ttl_secs: i64) -> ApiResult<String> {
        let mut claims = Claims::for_user(user_id, ttl_secs).with_issuer(&self.config.issuer);
        if let Some(ref audience) = self.config.audience {
            claims = claims.with_audience(audience);
        }
        self.create_token(&claims)
    }

    /// Validates and decodes a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                ErrorKind::InvalidSignature => ApiError::invalid_token("Invalid token signature"),
                ErrorKind::InvalidIssuer => ApiError::invalid_token("Invalid token issuer"),
                ErrorKind::InvalidAudience => ApiError::invalid_token("Invalid token audience"),
                ErrorKind::InvalidToken => ApiError::invalid_token("Invalid token format"),
                _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
            }
        })
    }

    /// Returns the token expiration time in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &ALGORITHM)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn manager() -> JwtManager {
        JwtManager::new(JwtConfig::new(SECRET)).unwrap()
    }

    #[test]
    fn test_create_and_validate_token() {
        let manager = manager();
        let user = UserId::new_random();

        let token = manager.create_access_token(user).unwrap();
        let token_data = manager.validate_token(&token).unwrap();

        assert_eq!(token_data.claims.user_id(), Some(user));
        assert_eq!(token_data.claims.iss.as_deref(), Some("contentflow"));
    }

    #[test]
    fn test_expired_token() {
        let manager = manager();

        let token = manager
            .create_token_with_ttl(UserId::new_random(), -3600)
            .unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }

    #[test]
    fn test_just_expired_token_is_rejected() {
        let manager = manager();
        let token = manager
            .create_token_with_ttl(UserId::new_random(), -5)
            .unwrap();
        let err = manager.validate_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }

    #[test]
    fn test_expiry_within_configured_leeway_is_accepted() {
        let manager = JwtManager::new(JwtConfig::new(SECRET).with_leeway(30)).unwrap();
        let token = manager
            .create_token_with_ttl(UserId::new_random(), -5)
            .unwrap();
        assert!(manager.validate_token(&token).is_ok());
    }

    #[test]
    fn test_invalid_token() {
        let err = manager().validate_token("invalid.token.here").unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken { .. }));
    }

    #[test]
    fn test_wrong_secret() {
        let manager1 =
            JwtManager::new(JwtConfig::new("secret-one-for-testing-purposes-0000")).unwrap();
        let manager2 =
            JwtManager::new(JwtConfig::new("secret-two-for-testing-purposes-0000")).unwrap();

        let token = manager1.create_access_token(UserId::new_random()).unwrap();

        let err = manager2.validate_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken { .. }));
    }

    #[test]
    fn test_wrong_issuer() {
        let other =
            JwtManager::new(JwtConfig::new(SECRET).with_issuer("someone-else")).unwrap();
        let token = other.create_access_token(UserId::new_random()).unwrap();

        let err = manager().validate_token(&token).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");
    }

    #[test]
    fn test_audience_is_enforced_when_configured() {
        let scoped =
            JwtManager::new(JwtConfig::new(SECRET).with_audience("dashboard")).unwrap();

        let elsewhere =
            JwtManager::new(JwtConfig::new(SECRET).with_audience("mobile")).unwrap();

        let token = elsewhere.create_access_token(UserId::new_random()).unwrap();
        assert!(scoped.validate_token(&token).is_err());

        let token = scoped.create_access_token(UserId::new_random()).unwrap();
        assert!(scoped.validate_token(&token).is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtManager::new(JwtConfig::default()).is_err());
    }
}
