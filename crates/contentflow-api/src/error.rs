// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every failure leaves the server as a flat JSON body:
//!
//! ```json
//! { "error": "TOKEN_EXPIRED", "message": "Token has expired" }
//! ```
//!
//! `error` is a stable machine-readable code; `message` is safe to show to
//! end users. Field validation failures add a `details` object.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contentflow_core::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    // ---- 401: authentication ------------------------------------------------
    /// No bearer credential on the request (401).
    #[error("Missing bearer token")]
    MissingToken,

    /// Signature or format check failed (401).
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Reason reported by the decoder.
        message: String,
    },

    /// Validly signed but past its expiry (401).
    #[error("Token expired")]
    TokenExpired,

    /// The token subject has no user record (401).
    #[error("User not found")]
    UserNotFound,

    /// No authenticated identity where one was required (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    // ---- 403: authorization -------------------------------------------------
    /// The caller's account is not active (403).
    #[error("Account is not active")]
    AccountInactive,

    /// The caller's role is not in the route's allow-list (403).
    #[error("Role '{role}' is not permitted")]
    InsufficientRole {
        /// The caller's role.
        role: String,
    },

    /// The caller does not own the addressed resource (403).
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Error message.
        message: String,
    },

    /// Any other forbidden action (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    // ---- 4xx: request -------------------------------------------------------
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Validation error (422).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// Field-specific errors.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    // ---- 5xx ----------------------------------------------------------------
    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// Persistence failure (500).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates an invalid token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates an insufficient role error.
    pub fn insufficient_role(role: impl Into<String>) -> Self {
        Self::InsufficientRole { role: role.into() }
    }

    /// Creates an access denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error with field errors.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken
            | ApiError::InvalidToken { .. }
            | ApiError::TokenExpired
            | ApiError::UserNotFound
            | ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::AccountInactive
            | ApiError::InsufficientRole { .. }
            | ApiError::AccessDenied { .. }
            | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the stable error code placed in the `error` field.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingToken => "MISSING_TOKEN",
            ApiError::InvalidToken { .. } => "INVALID_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::AccountInactive => "ACCOUNT_INACTIVE",
            ApiError::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            ApiError::AccessDenied { .. } => "ACCESS_DENIED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } | ApiError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// This message is safe to show to end users and does not expose
    /// internal implementation details.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::MissingToken => "Authentication token is required".to_string(),
            ApiError::InvalidToken { .. } => "Authentication token is invalid".to_string(),
            ApiError::TokenExpired => "Authentication token has expired".to_string(),
            ApiError::UserNotFound => "User account no longer exists".to_string(),
            ApiError::Unauthorized { .. } => "Authentication is required".to_string(),
            ApiError::AccountInactive => "User account is not active".to_string(),
            ApiError::InsufficientRole { .. } => {
                "Your role does not permit this action".to_string()
            }
            ApiError::AccessDenied { message } => message.clone(),
            ApiError::Forbidden { message } => message.clone(),
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Conflict { message } => message.clone(),
            ApiError::ServiceUnavailable { .. } => {
                "Service is temporarily unavailable".to_string()
            }
            ApiError::Internal { .. } | ApiError::Store(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: error_code.to_string(),
            message: self.user_message(),
            details: self.error_details(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error code for programmatic handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts to an ApiError if there are errors.
    pub fn into_result<T>(self, success: T) -> ApiResult<T> {
        if self.is_empty() {
            Ok(success)
        } else {
            Err(ApiError::validation_with_errors("Validation failed", self))
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorResponseBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::UserNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AccountInactive.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::insufficient_role("client").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::access_denied("no").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::not_found("Workspace").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("bad transition").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Store(StoreError::unavailable("down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_expired_and_invalid_codes_differ() {
        assert_eq!(ApiError::TokenExpired.error_code(), "TOKEN_EXPIRED");
        assert_eq!(ApiError::invalid_token("bad").error_code(), "INVALID_TOKEN");
        assert_ne!(
            ApiError::TokenExpired.error_code(),
            ApiError::invalid_token("bad").error_code()
        );
    }

    #[tokio::test]
    async fn test_body_is_flat() {
        let (status, body) = body_of(ApiError::access_denied("You do not own this workspace")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error, "ACCESS_DENIED");
        assert_eq!(body.message, "You do not own this workspace");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_internal_message_is_hidden() {
        let err = ApiError::Store(StoreError::unavailable("connection refused to 10.0.0.4"));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert!(!body.message.contains("10.0.0.4"));
    }

    #[tokio::test]
    async fn test_validation_details() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "must not be empty");
        let (_, body) = body_of(errors.into_result(()).unwrap_err()).await;
        assert_eq!(body.error, "VALIDATION_ERROR");
        let details = body.details.unwrap();
        assert_eq!(details["fields"][0]["field"], "title");
    }

    #[test]
    fn test_validation_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("email", "Invalid email format");
        errors.add("name", "Too short");

        assert!(!errors.is_empty());
        assert_eq!(errors.fields.len(), 2);
    }
}
