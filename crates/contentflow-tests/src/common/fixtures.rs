// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! One seed document describing a small agency:
//!
//! - `OWNER` (creator) owns workspace `WORKSPACE`
//! - `MEMBER` (agency) is an active member, `INVITED` (creator) only invited
//! - `CLIENT_CO` belongs to the workspace, was created by `OUTSIDER` and is
//!   linked to the `CLIENT_USER` login
//! - `LOOSE_CLIENT` has no workspace
//! - `DRAFT_ITEM` and `REVIEW_ITEM` are content by `OWNER` for `CLIENT_CO`

use std::str::FromStr;

use contentflow_core::MemoryStore;
use serde_json::{Value, json};

/// Shared JWT secret for all fixtures.
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Well-known record ids.
pub struct Ids;

impl Ids {
    /// Admin user.
    pub const ADMIN: &'static str = "00000000-0000-4000-8000-000000000001";
    /// Creator who owns the workspace.
    pub const OWNER: &'static str = "00000000-0000-4000-8000-000000000002";
    /// Agency user with an active membership.
    pub const MEMBER: &'static str = "00000000-0000-4000-8000-000000000003";
    /// Creator whose membership is only an invitation.
    pub const INVITED: &'static str = "00000000-0000-4000-8000-000000000004";
    /// Creator with no relation to the workspace.
    pub const OUTSIDER: &'static str = "00000000-0000-4000-8000-000000000005";
    /// Client login linked to `CLIENT_CO`.
    pub const CLIENT_USER: &'static str = "00000000-0000-4000-8000-000000000006";
    /// Client login linked to nothing.
    pub const OTHER_CLIENT_USER: &'static str = "00000000-0000-4000-8000-000000000007";
    /// Suspended admin.
    pub const SUSPENDED_ADMIN: &'static str = "00000000-0000-4000-8000-000000000008";
    /// Inactive creator.
    pub const INACTIVE: &'static str = "00000000-0000-4000-8000-000000000009";

    /// The workspace.
    pub const WORKSPACE: &'static str = "10000000-0000-4000-8000-000000000001";

    /// Client inside the workspace.
    pub const CLIENT_CO: &'static str = "20000000-0000-4000-8000-000000000001";
    /// Client without a workspace, created by `OWNER`.
    pub const LOOSE_CLIENT: &'static str = "20000000-0000-4000-8000-000000000002";

    /// Draft content item.
    pub const DRAFT_ITEM: &'static str = "30000000-0000-4000-8000-000000000001";
    /// Content item waiting for review.
    pub const REVIEW_ITEM: &'static str = "30000000-0000-4000-8000-000000000002";
    /// Content item by `OUTSIDER` with no client.
    pub const OUTSIDER_ITEM: &'static str = "30000000-0000-4000-8000-000000000003";

    /// Parses one of the constants into a typed id.
    pub fn typed<T: FromStr>(id: &str) -> T
    where
        T::Err: std::fmt::Debug,
    {
        id.parse().expect("fixture ids are valid UUIDs")
    }
}

/// Builds the seed document.
pub fn seed() -> Value {
    json!({
        "users": [
            user(Ids::ADMIN, "admin", "active"),
            user(Ids::OWNER, "creator", "active"),
            user(Ids::MEMBER, "agency", "active"),
            user(Ids::INVITED, "creator", "active"),
            user(Ids::OUTSIDER, "creator", "active"),
            user(Ids::CLIENT_USER, "client", "active"),
            user(Ids::OTHER_CLIENT_USER, "client", "active"),
            user(Ids::SUSPENDED_ADMIN, "admin", "suspended"),
            user(Ids::INACTIVE, "creator", "inactive"),
        ],
        "workspaces": [
            { "id": Ids::WORKSPACE, "name": "Northwind Studio", "owner_id": Ids::OWNER },
        ],
        "workspace_members": [
            { "workspace_id": Ids::WORKSPACE, "user_id": Ids::MEMBER, "role": "editor", "status": "active" },
            { "workspace_id": Ids::WORKSPACE, "user_id": Ids::INVITED, "status": "invited" },
        ],
        "clients": [
            {
                "id": Ids::CLIENT_CO,
                "name": "Acme Coffee",
                "creator_id": Ids::OUTSIDER,
                "user_id": Ids::CLIENT_USER,
                "workspace_id": Ids::WORKSPACE,
            },
            {
                "id": Ids::LOOSE_CLIENT,
                "name": "Solo Bakery",
                "creator_id": Ids::OWNER,
            },
        ],
        "content_items": [
            content(Ids::DRAFT_ITEM, "Spring launch", Ids::OWNER, Some(Ids::CLIENT_CO), "draft", "2025-01-01T00:00:00Z"),
            content(Ids::REVIEW_ITEM, "Holiday teaser", Ids::OWNER, Some(Ids::CLIENT_CO), "review", "2025-01-02T00:00:00Z"),
            content(Ids::OUTSIDER_ITEM, "Side project", Ids::OUTSIDER, None, "draft", "2025-01-03T00:00:00Z"),
        ],
    })
}

/// A memory store loaded with [`seed`].
pub fn seeded_store() -> MemoryStore {
    MemoryStore::from_seed(seed()).expect("fixture seed is valid")
}

fn user(id: &str, role: &str, status: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", &id[id.len() - 4..]),
        "full_name": format!("User {}", &id[id.len() - 1..]),
        "role": role,
        "status": status,
        "created_at": "2025-01-01T00:00:00Z",
    })
}

fn content(
    id: &str,
    title: &str,
    creator: &str,
    client: Option<&str>,
    status: &str,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "title": title,
        "body": "",
        "creator_id": creator,
        "client_id": client,
        "status": status,
        "created_at": created_at,
    })
}
