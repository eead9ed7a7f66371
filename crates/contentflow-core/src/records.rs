// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed repository over a [`Store`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    Client, ClientWithWorkspace, ContentItem, ContentStatus, MemberStatus, Role, User, UserStatus,
    Workspace, WorkspaceMember,
};
use crate::store::{Query, Row, Store, tables};
use crate::types::{ClientId, ContentId, UserId, WorkspaceId};

// =============================================================================
// ContentFilter
// =============================================================================

/// Filter for content listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
    /// Only items owned by this creator.
    pub creator_id: Option<UserId>,
    /// Only items produced for this client.
    pub client_id: Option<ClientId>,
    /// Only items in this state.
    pub status: Option<ContentStatus>,
}

impl ContentFilter {
    /// Restricts to one creator.
    pub fn creator(mut self, id: UserId) -> Self {
        self.creator_id = Some(id);
        self
    }

    /// Restricts to one client.
    pub fn client(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Restricts to one status.
    pub fn status(mut self, status: ContentStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn apply(&self, mut query: Query) -> Query {
        if let Some(id) = self.creator_id {
            query = query.eq("creator_id", id.to_string());
        }
        if let Some(id) = self.client_id {
            query = query.eq("client_id", id.to_string());
        }
        if let Some(status) = self.status {
            query = query.eq("status", status.as_str());
        }
        query
    }
}

// =============================================================================
// Records
// =============================================================================

/// Typed access to the ContentFlow tables.
///
/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn Store>,
}

impl std::fmt::Debug for Records {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Records")
            .field("store", &self.store.name())
            .finish()
    }
}

impl Records {
    /// Wraps a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Looks up a user.
    pub async fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.get(tables::USERS, &id.to_string()).await
    }

    /// Lists users, newest first, optionally restricted to one role.
    pub async fn list_users(
        &self,
        role: Option<Role>,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<User>> {
        let query = users_query(role)
            .order_desc("created_at")
            .offset(offset)
            .limit(limit);
        self.select(&query).await
    }

    /// Counts users, optionally restricted to one role.
    pub async fn count_users(&self, role: Option<Role>) -> StoreResult<u64> {
        self.store.count(&users_query(role)).await
    }

    /// Changes a user's role.
    pub async fn update_user_role(&self, id: UserId, role: Role) -> StoreResult<Option<User>> {
        let mut patch = Row::new();
        patch.insert("role".into(), Value::from(role.as_str()));
        self.update(tables::USERS, &id.to_string(), patch).await
    }

    /// Changes a user's account status.
    pub async fn update_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> StoreResult<Option<User>> {
        let mut patch = Row::new();
        patch.insert("status".into(), Value::from(status.as_str()));
        self.update(tables::USERS, &id.to_string(), patch).await
    }

    // -------------------------------------------------------------------------
    // Workspaces
    // -------------------------------------------------------------------------

    /// Looks up a workspace.
    pub async fn workspace(&self, id: WorkspaceId) -> StoreResult<Option<Workspace>> {
        self.get(tables::WORKSPACES, &id.to_string()).await
    }

    /// Looks up a user's active membership in a workspace.
    ///
    /// Invited and removed rows for the same pair are ignored, so history
    /// left beside an active row never hides it.
    pub async fn active_membership(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> StoreResult<Option<WorkspaceMember>> {
        let query = Query::table(tables::WORKSPACE_MEMBERS)
            .eq("workspace_id", workspace_id.to_string())
            .eq("user_id", user_id.to_string())
            .eq("status", MemberStatus::Active.as_str())
            .limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }

    /// Lists every membership of a workspace.
    pub async fn workspace_members(
        &self,
        workspace_id: WorkspaceId,
    ) -> StoreResult<Vec<WorkspaceMember>> {
        let query = Query::table(tables::WORKSPACE_MEMBERS)
            .eq("workspace_id", workspace_id.to_string())
            .order_asc("user_id");
        self.select(&query).await
    }

    // -------------------------------------------------------------------------
    // Clients
    // -------------------------------------------------------------------------

    /// Looks up a client.
    pub async fn client(&self, id: ClientId) -> StoreResult<Option<Client>> {
        self.get(tables::CLIENTS, &id.to_string()).await
    }

    /// Looks up a client together with its workspace.
    ///
    /// A dangling `workspace_id` yields `workspace: None`.
    pub async fn client_with_workspace(
        &self,
        id: ClientId,
    ) -> StoreResult<Option<ClientWithWorkspace>> {
        let Some(client) = self.client(id).await? else {
            return Ok(None);
        };
        let workspace = match client.workspace_id {
            Some(ws) => self.workspace(ws).await?,
            None => None,
        };
        Ok(Some(ClientWithWorkspace { client, workspace }))
    }

    /// Returns the client record linked to a client login, if any.
    pub async fn client_for_user(&self, user_id: UserId) -> StoreResult<Option<Client>> {
        let query = Query::table(tables::CLIENTS)
            .eq("user_id", user_id.to_string())
            .limit(1);
        Ok(self.select(&query).await?.into_iter().next())
    }

    /// Stores a new client.
    pub async fn insert_client(&self, client: &Client) -> StoreResult<Client> {
        self.insert(tables::CLIENTS, client).await
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Looks up a content item.
    pub async fn content(&self, id: ContentId) -> StoreResult<Option<ContentItem>> {
        self.get(tables::CONTENT_ITEMS, &id.to_string()).await
    }

    /// Lists content items, newest first.
    pub async fn list_content(
        &self,
        filter: &ContentFilter,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<ContentItem>> {
        let query = filter
            .apply(Query::table(tables::CONTENT_ITEMS))
            .order_desc("created_at")
            .offset(offset)
            .limit(limit);
        self.select(&query).await
    }

    /// Counts content items.
    pub async fn count_content(&self, filter: &ContentFilter) -> StoreResult<u64> {
        self.store
            .count(&filter.apply(Query::table(tables::CONTENT_ITEMS)))
            .await
    }

    /// Stores a new content item.
    pub async fn insert_content(&self, item: &ContentItem) -> StoreResult<ContentItem> {
        self.insert(tables::CONTENT_ITEMS, item).await
    }

    /// Moves a content item to `status`.
    ///
    /// Stamps `updated_at`, and `published_at` when the item goes live. The
    /// lifecycle check is the caller's job.
    pub async fn update_content_status(
        &self,
        id: ContentId,
        status: ContentStatus,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<ContentItem>> {
        let now = Utc::now();
        let mut patch = Row::new();
        patch.insert("status".into(), Value::from(status.as_str()));
        patch.insert("updated_at".into(), Value::from(now.to_rfc3339()));
        if let Some(at) = scheduled_at {
            patch.insert("scheduled_at".into(), Value::from(at.to_rfc3339()));
        }
        if status == ContentStatus::Published {
            patch.insert("published_at".into(), Value::from(now.to_rfc3339()));
        }
        self.update(tables::CONTENT_ITEMS, &id.to_string(), patch)
            .await
    }

    // -------------------------------------------------------------------------
    // Row plumbing
    // -------------------------------------------------------------------------

    async fn get<T: DeserializeOwned>(&self, table: &str, id: &str) -> StoreResult<Option<T>> {
        self.store
            .get(table, id)
            .await?
            .map(|row| decode(table, row))
            .transpose()
    }

    async fn select<T: DeserializeOwned>(&self, query: &Query) -> StoreResult<Vec<T>> {
        self.store
            .select(query)
            .await?
            .into_iter()
            .map(|row| decode(&query.table, row))
            .collect()
    }

    async fn insert<T: Serialize + DeserializeOwned>(
        &self,
        table: &str,
        record: &T,
    ) -> StoreResult<T> {
        let row = encode(table, record)?;
        decode(table, self.store.insert(table, row).await?)
    }

    async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        patch: Row,
    ) -> StoreResult<Option<T>> {
        self.store
            .update(table, id, patch)
            .await?
            .map(|row| decode(table, row))
            .transpose()
    }
}

fn users_query(role: Option<Role>) -> Query {
    let query = Query::table(tables::USERS);
    match role {
        Some(role) => query.eq("role", role.as_str()),
        None => query,
    }
}

fn decode<T: DeserializeOwned>(table: &str, row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::decode(table, e.to_string()))
}

fn encode<T: Serialize>(table: &str, record: &T) -> StoreResult<Row> {
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(StoreError::decode(table, "record did not serialize to an object")),
        Err(e) => Err(StoreError::decode(table, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    const OWNER: &str = "11111111-1111-4111-8111-111111111111";
    const MEMBER: &str = "22222222-2222-4222-8222-222222222222";
    const CLIENT_LOGIN: &str = "33333333-3333-4333-8333-333333333333";
    const WS: &str = "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa";
    const CLIENT: &str = "cccccccc-cccc-4ccc-8ccc-cccccccccccc";
    const ORPHAN: &str = "dddddddd-dddd-4ddd-8ddd-dddddddddddd";

    fn records() -> Records {
        let store = MemoryStore::from_seed(json!({
            "users": [
                { "id": OWNER, "email": "owner@example.com", "role": "agency", "status": "active",
                  "created_at": "2025-01-01T00:00:00Z" },
                { "id": MEMBER, "email": "m@example.com", "role": "creator", "status": "active",
                  "created_at": "2025-01-02T00:00:00Z" },
                { "id": CLIENT_LOGIN, "email": "c@example.com", "role": "client", "status": "inactive",
                  "created_at": "2025-01-03T00:00:00Z" },
            ],
            "workspaces": [ { "id": WS, "name": "Studio", "owner_id": OWNER } ],
            "workspace_members": [
                { "workspace_id": WS, "user_id": MEMBER, "role": "editor", "status": "active" },
                { "workspace_id": WS, "user_id": CLIENT_LOGIN, "status": "pending" },
            ],
            "clients": [
                { "id": CLIENT, "name": "Acme", "creator_id": MEMBER, "user_id": CLIENT_LOGIN,
                  "workspace_id": WS },
                { "id": ORPHAN, "name": "Loose", "creator_id": MEMBER,
                  "workspace_id": "eeeeeeee-eeee-4eee-8eee-eeeeeeeeeeee" },
            ],
        }))
        .unwrap();
        Records::new(Arc::new(store))
    }

    fn id<T: std::str::FromStr>(s: &str) -> T
    where
        T::Err: std::fmt::Debug,
    {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let records = records();
        let user = records.user(id(OWNER)).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Agency);
        assert!(records.user(UserId::new_random()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_membership() {
        let records = records();
        let member = records
            .active_membership(id(WS), id(MEMBER))
            .await
            .unwrap()
            .unwrap();
        assert!(member.is_active());
        assert_eq!(member.role, "editor");

        assert!(
            records
                .active_membership(id(WS), id(CLIENT_LOGIN))
                .await
                .unwrap()
                .is_none()
        );

        let members = records.workspace_members(id(WS)).await.unwrap();
        assert_eq!(members.len(), 2);
        let invited = members.iter().find(|m| m.user_id == id(CLIENT_LOGIN)).unwrap();
        assert_eq!(invited.status, MemberStatus::Invited);
        assert_eq!(invited.role, "member");
    }

    #[tokio::test]
    async fn test_active_membership_skips_stale_rows() {
        let store = MemoryStore::from_seed(json!({
            "workspace_members": [
                { "workspace_id": WS, "user_id": MEMBER, "status": "removed" },
                { "workspace_id": WS, "user_id": MEMBER, "status": "invited" },
                { "workspace_id": WS, "user_id": MEMBER, "role": "editor", "status": "active" },
            ],
        }))
        .unwrap();
        let records = Records::new(Arc::new(store));

        let member = records
            .active_membership(id(WS), id(MEMBER))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role, "editor");
    }

    #[tokio::test]
    async fn test_client_with_workspace() {
        let records = records();
        let joined = records.client_with_workspace(id(CLIENT)).await.unwrap().unwrap();
        assert_eq!(joined.workspace_owner(), Some(id(OWNER)));

        let dangling = records.client_with_workspace(id(ORPHAN)).await.unwrap().unwrap();
        assert!(dangling.workspace.is_none());

        assert!(records.client_with_workspace(ClientId::new_random()).await.unwrap().is_none());

        let linked = records.client_for_user(id(CLIENT_LOGIN)).await.unwrap().unwrap();
        assert_eq!(linked.id, id(CLIENT));
    }

    #[tokio::test]
    async fn test_content_round_trip() {
        let records = records();
        let creator: UserId = id(MEMBER);
        for (n, status) in [ContentStatus::Draft, ContentStatus::Review].into_iter().enumerate() {
            let item = ContentItem {
                id: ContentId::new_random(),
                title: format!("Post {}", n),
                body: String::new(),
                platform: Some("instagram".into()),
                creator_id: creator,
                client_id: Some(id(CLIENT)),
                status,
                scheduled_at: None,
                published_at: None,
                created_at: Some(Utc::now()),
                updated_at: None,
            };
            records.insert_content(&item).await.unwrap();
        }

        let mine = ContentFilter::default().creator(creator);
        assert_eq!(records.count_content(&mine).await.unwrap(), 2);
        assert_eq!(records.list_content(&mine, 0, 1).await.unwrap().len(), 1);

        let drafts = mine.clone().status(ContentStatus::Draft);
        let draft = records.list_content(&drafts, 0, 10).await.unwrap().remove(0);

        let updated = records
            .update_content_status(draft.id, ContentStatus::Review, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ContentStatus::Review);
        assert!(updated.updated_at.is_some());
        assert_eq!(records.count_content(&drafts).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_admin_updates() {
        let records = records();
        assert_eq!(records.count_users(None).await.unwrap(), 3);
        assert_eq!(records.count_users(Some(Role::Creator)).await.unwrap(), 1);

        let newest = records.list_users(None, 0, 1).await.unwrap();
        assert_eq!(newest[0].id, id(CLIENT_LOGIN));

        let user = records
            .update_user_status(id(CLIENT_LOGIN), UserStatus::Active)
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_active());

        let user = records
            .update_user_role(id(MEMBER), Role::Agency)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::Agency);

        assert!(
            records
                .update_user_role(UserId::new_random(), Role::Admin)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let store = MemoryStore::new();
        store
            .put(tables::USERS, json!({ "id": OWNER, "email": "x", "role": "wizard", "status": "active" }))
            .unwrap();
        let records = Records::new(Arc::new(store));

        let err = records.user(id(OWNER)).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
