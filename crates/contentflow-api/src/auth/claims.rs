// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access-token claims.

use chrono::Utc;
use contentflow_core::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered claims carried by a ContentFlow access token.
///
/// The subject is the user's UUID. Role and status are not carried; they are
/// read from the user record on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl_secs` from now. A negative TTL
    /// yields an already expired token.
    pub fn for_user(user_id: UserId, ttl_secs: i64) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: iat + ttl_secs,
            iat,
            iss: None,
            aud: None,
            jti: Some(Uuid::now_v7().to_string()),
        }
    }

    /// The subject as a user id, `None` when it is not a UUID.
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub)
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Sets the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = Some(audience.into());
        self
    }
}
