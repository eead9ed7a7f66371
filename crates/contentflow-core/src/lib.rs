// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # contentflow-core
//!
//! Domain model and persistence collaborators for the ContentFlow
//! access-control service.
//!
//! ## Modules
//!
//! - [`types`]: Strongly typed record identifiers
//! - [`model`]: Users, workspaces, clients and content items
//! - [`store`]: The [`Store`] trait and its query language
//! - [`memory`]: In-process [`MemoryStore`] used for development and tests
//! - [`rest`]: PostgREST-compatible [`RestStore`]
//! - [`records`]: Typed repository over any [`Store`]
//!
//! The store is always passed around as `Arc<dyn Store>` so that every
//! consumer can be exercised against a substitute implementation.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod model;
pub mod records;
pub mod rest;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use model::{
    Client, ClientWithWorkspace, ContentItem, ContentStatus, MemberStatus, Role, User,
    UserStatus, Workspace, WorkspaceMember,
};
pub use records::{ContentFilter, Records};
pub use rest::{RestStore, RestStoreConfig};
pub use store::{Filter, FilterOp, Order, Query, Row, Store, tables};
pub use types::{ClientId, ContentId, UserId, WorkspaceId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
