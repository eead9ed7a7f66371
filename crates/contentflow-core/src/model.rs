// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Domain records.
//!
//! Ownership of every protected record traces back to exactly one user:
//! workspaces through `owner_id`, clients and content items through
//! `creator_id`. Access checks walk this chain at most one hop.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientId, ContentId, UserId, WorkspaceId};

// =============================================================================
// Role
// =============================================================================

/// Account role.
///
/// Roles are flat labels. There is no implied ordering between them; `Admin`
/// is special only because the ownership checks bypass it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Agency account managing several creators and clients.
    Agency,
    /// Individual content creator.
    Creator,
    /// End customer with a self-service login.
    Client,
}

impl Role {
    /// Returns the role name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agency => "agency",
            Role::Creator => "creator",
            Role::Client => "client",
        }
    }

    /// Parses a role name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "agency" => Some(Role::Agency),
            "creator" => Some(Role::Creator),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    /// Returns every role.
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Agency, Role::Creator, Role::Client]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Users
// =============================================================================

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// The account may sign in.
    Active,
    /// Deactivated by the user or by an admin.
    Inactive,
    /// Suspended by an admin.
    Suspended,
}

impl UserStatus {
    /// Returns the status name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }

    /// Parses a status name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "suspended" => Some(UserStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Account role.
    pub role: Role,
    /// Account status.
    pub status: UserStatus,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Returns `true` if the account is active.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// =============================================================================
// Workspaces
// =============================================================================

/// A workspace grouping clients under one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace ID.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// The single owning user.
    pub owner_id: UserId,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Membership state of a workspace member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Full member.
    Active,
    /// Invitation sent but not yet accepted.
    #[serde(alias = "pending")]
    Invited,
    /// Removed from the workspace.
    Removed,
}

impl MemberStatus {
    /// Returns the status name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Invited => "invited",
            MemberStatus::Removed => "removed",
        }
    }
}

/// A user's membership in a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    /// Workspace the membership belongs to.
    pub workspace_id: WorkspaceId,
    /// Member user.
    pub user_id: UserId,
    /// Per-workspace role label (free-form, e.g. "editor").
    #[serde(default = "default_member_role")]
    pub role: String,
    /// Membership state.
    pub status: MemberStatus,
}

fn default_member_role() -> String {
    "member".to_string()
}

impl WorkspaceMember {
    /// Returns `true` if the membership is active.
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

// =============================================================================
// Clients
// =============================================================================

/// An end customer managed by a creator or agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Client ID.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// The creator or agency user who created the record.
    pub creator_id: UserId,
    /// Login linked to this client for self-service, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Workspace the client is grouped under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<WorkspaceId>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A client joined with its workspace (one hop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientWithWorkspace {
    /// The client record.
    #[serde(flatten)]
    pub client: Client,
    /// The client's workspace, if it has one and it still exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,
}

impl ClientWithWorkspace {
    /// Returns the owner of the client's workspace, if any.
    pub fn workspace_owner(&self) -> Option<UserId> {
        self.workspace.as_ref().map(|w| w.owner_id)
    }
}

// =============================================================================
// Content
// =============================================================================

/// Lifecycle state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Being written.
    Draft,
    /// Waiting for approval.
    Review,
    /// Approved for scheduling.
    Approved,
    /// Sent back for rework.
    Rejected,
    /// Queued for publication.
    Scheduled,
    /// Live on the target platform.
    Published,
}

impl ContentStatus {
    /// Returns the status name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Review => "review",
            ContentStatus::Approved => "approved",
            ContentStatus::Rejected => "rejected",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Published => "published",
        }
    }

    /// Parses a status name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(ContentStatus::Draft),
            "review" => Some(ContentStatus::Review),
            "approved" => Some(ContentStatus::Approved),
            "rejected" => Some(ContentStatus::Rejected),
            "scheduled" => Some(ContentStatus::Scheduled),
            "published" => Some(ContentStatus::Published),
            _ => None,
        }
    }

    /// Returns `true` if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, next),
            (Draft, Review)
                | (Review, Approved)
                | (Review, Rejected)
                | (Rejected, Draft)
                | (Approved, Scheduled)
                | (Scheduled, Published)
        )
    }

    /// Returns `true` for the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContentStatus::Published)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of plannable, publishable content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content ID.
    pub id: ContentId,
    /// Headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
    /// Target platform (e.g. "instagram").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Owning creator.
    pub creator_id: UserId,
    /// Client the item is produced for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    /// Lifecycle state.
    pub status: ContentStatus,
    /// Planned publication time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Actual publication time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Agency"), Some(Role::Agency));
        assert_eq!(Role::parse(" CLIENT "), Some(Role::Client));
        assert_eq!(Role::parse("superadmin"), None);
    }

    #[test]
    fn test_content_lifecycle() {
        use ContentStatus::*;
        assert!(Draft.can_transition_to(Review));
        assert!(Review.can_transition_to(Approved));
        assert!(Review.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Draft));
        assert!(Approved.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Published));

        assert!(!Draft.can_transition_to(Published));
        assert!(!Rejected.can_transition_to(Scheduled));
        assert!(!Published.can_transition_to(Draft));
        assert!(Published.is_terminal());
    }

    #[test]
    fn test_member_status_accepts_pending_alias() {
        let status: MemberStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, MemberStatus::Invited);
    }

    #[test]
    fn test_user_from_row() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "email": "ana@example.com",
            "role": "creator",
            "status": "suspended",
        }))
        .unwrap();

        assert_eq!(user.role, Role::Creator);
        assert!(!user.is_active());
        assert!(user.full_name.is_none());
    }

    #[test]
    fn test_client_with_workspace_owner() {
        let owner = UserId::new_random();
        let client = Client {
            id: ClientId::new_random(),
            name: "Acme".to_string(),
            creator_id: UserId::new_random(),
            user_id: None,
            workspace_id: None,
            email: None,
            created_at: None,
        };
        let joined = ClientWithWorkspace {
            client: client.clone(),
            workspace: Some(Workspace {
                id: WorkspaceId::new_random(),
                name: "Studio".to_string(),
                owner_id: owner,
                created_at: None,
            }),
        };
        assert_eq!(joined.workspace_owner(), Some(owner));

        let orphan = ClientWithWorkspace {
            client,
            workspace: None,
        };
        assert_eq!(orphan.workspace_owner(), None);
    }
}
