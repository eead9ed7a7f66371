// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Resource ownership rules.
//!
//! Every protected record traces back to one owning user in at most one hop:
//!
//! - workspace → `owner_id` (or an active member)
//! - client → linked login (`user_id`) for client callers, otherwise the
//!   owner of the client's workspace
//! - content item → `creator_id`, or the linked login of its client
//!
//! Admins bypass every rule without touching the store.

use contentflow_core::{ClientId, ContentItem, Records, Role, WorkspaceId};
use tracing::debug;

use super::AuthContext;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// OwnershipTarget
// =============================================================================

/// The resource identifiers a request addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnershipTarget {
    /// Workspace named in the path.
    pub workspace_id: Option<WorkspaceId>,
    /// Client named in the path.
    pub client_id: Option<ClientId>,
}

impl OwnershipTarget {
    /// Targets a workspace.
    pub fn workspace(id: WorkspaceId) -> Self {
        Self {
            workspace_id: Some(id),
            client_id: None,
        }
    }

    /// Targets a client.
    pub fn client(id: ClientId) -> Self {
        Self {
            workspace_id: None,
            client_id: Some(id),
        }
    }

    /// Adds a client to the target.
    pub fn with_client(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Builds a target from raw path segments.
    ///
    /// A segment that is not a UUID cannot name any row, so it is reported
    /// as not found rather than as a malformed request.
    pub fn from_raw(workspace_id: Option<&str>, client_id: Option<&str>) -> ApiResult<Self> {
        let workspace_id = workspace_id
            .map(|raw| WorkspaceId::parse(raw).ok_or_else(|| ApiError::not_found("Workspace")))
            .transpose()?;
        let client_id = client_id
            .map(|raw| ClientId::parse(raw).ok_or_else(|| ApiError::not_found("Client")))
            .transpose()?;
        Ok(Self {
            workspace_id,
            client_id,
        })
    }

    /// Returns `true` if no identifier is present.
    pub fn is_empty(&self) -> bool {
        self.workspace_id.is_none() && self.client_id.is_none()
    }
}

// =============================================================================
// OwnershipGuard
// =============================================================================

/// Evaluates ownership of workspaces, clients and content items.
#[derive(Debug, Clone)]
pub struct OwnershipGuard {
    records: Records,
}

impl OwnershipGuard {
    /// Creates a guard over the given records.
    pub fn new(records: Records) -> Self {
        Self { records }
    }

    /// Checks every identifier in `target`.
    ///
    /// The workspace check runs first; both must pass when both are present.
    pub async fn check(&self, ctx: &AuthContext, target: &OwnershipTarget) -> ApiResult<()> {
        if ctx.is_admin() {
            return Ok(());
        }
        if let Some(workspace_id) = target.workspace_id {
            self.check_workspace(ctx, workspace_id).await?;
        }
        if let Some(client_id) = target.client_id {
            self.check_client(ctx, client_id).await?;
        }
        Ok(())
    }

    /// Permits the workspace owner or an active member.
    pub async fn check_workspace(&self, ctx: &AuthContext, id: WorkspaceId) -> ApiResult<()> {
        if ctx.is_admin() {
            return Ok(());
        }

        let workspace = self
            .records
            .workspace(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Workspace"))?;

        if ctx.is(workspace.owner_id) {
            return Ok(());
        }

        if self.records.active_membership(id, ctx.user_id).await?.is_some() {
            return Ok(());
        }

        debug!(
            user_id = %ctx.user_id,
            role = %ctx.role,
            workspace_id = %id,
            "Workspace access denied"
        );
        Err(ApiError::access_denied(
            "You do not have access to this workspace",
        ))
    }

    /// Permits a client's linked login, or the owner of the client's workspace.
    ///
    /// The client's `creator_id` is not consulted for non-client callers, and
    /// a client without a workspace is only reachable by its linked login.
    pub async fn check_client(&self, ctx: &AuthContext, id: ClientId) -> ApiResult<()> {
        if ctx.is_admin() {
            return Ok(());
        }

        let joined = self
            .records
            .client_with_workspace(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Client"))?;

        let permitted = match ctx.role {
            Role::Client => joined.client.user_id == Some(ctx.user_id),
            _ => joined.workspace_owner() == Some(ctx.user_id),
        };
        if permitted {
            return Ok(());
        }

        debug!(
            user_id = %ctx.user_id,
            role = %ctx.role,
            client_id = %id,
            "Client access denied"
        );
        Err(ApiError::access_denied("You do not have access to this client"))
    }

    /// Permits the item's creator, or the linked login of the item's client.
    pub async fn check_content(&self, ctx: &AuthContext, item: &ContentItem) -> ApiResult<()> {
        if ctx.is_admin() || ctx.is(item.creator_id) {
            return Ok(());
        }

        if ctx.role == Role::Client {
            if let Some(client_id) = item.client_id {
                let client = self.records.client(client_id).await?;
                if client.is_some_and(|c| c.user_id == Some(ctx.user_id)) {
                    return Ok(());
                }
            }
        }

        debug!(
            user_id = %ctx.user_id,
            role = %ctx.role,
            content_id = %item.id,
            "Content access denied"
        );
        Err(ApiError::access_denied(
            "You do not have access to this content",
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
