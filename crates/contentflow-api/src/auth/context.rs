// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use contentflow_core::{Role, User, UserId, UserStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context for a request.
///
/// Inserted into request extensions by the Token Verifier once the token is
/// valid and the user record is active. Role and status are copies of the
/// user record as read during verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    /// User ID.
    pub user_id: UserId,
    /// Account role.
    pub role: Role,
    /// Account status.
    pub status: UserStatus,
    /// User's email.
    pub email: String,
    /// User's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context from a resolved user record.
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            status: user.status,
            email: user.email.clone(),
            name: user.full_name.clone(),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if the context has the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if the context has any of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Returns `true` if this context has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns `true` if `id` is the caller.
    pub fn is(&self, id: UserId) -> bool {
        self.user_id == id
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: UserId::new_random(),
            email: "jo@example.com".to_string(),
            full_name: Some("Jo".to_string()),
            role,
            status: UserStatus::Active,
            created_at: None,
        }
    }

    #[test]
    fn test_from_user() {
        let record = user(Role::Creator);
        let ctx = AuthContext::from_user(&record);

        assert!(ctx.is(record.id));
        assert!(ctx.has_role(Role::Creator));
        assert!(!ctx.is_admin());
        assert_eq!(ctx.name.as_deref(), Some("Jo"));
    }

    #[test]
    fn test_roles_are_flat() {
        let admin = AuthContext::from_user(&user(Role::Admin));
        assert!(admin.is_admin());
        // Admin does not imply membership of any other role.
        assert!(!admin.has_role(Role::Creator));
        assert!(!admin.has_any_role(&[Role::Agency, Role::Client]));
        assert!(admin.has_any_role(&[Role::Agency, Role::Admin]));
    }

    #[test]
    fn test_with_client_ip() {
        let ctx = AuthContext::from_user(&user(Role::Agency))
            .with_client_ip("10.1.2.3".parse().unwrap());
        assert_eq!(ctx.client_ip, Some("10.1.2.3".parse().unwrap()));
    }
}
