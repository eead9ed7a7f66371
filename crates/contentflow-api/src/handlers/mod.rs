// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Liveness and readiness
//! - [`auth`]: The caller's own identity
//! - [`workspaces`]: Workspace lookups behind the Ownership Gate
//! - [`clients`]: Client records
//! - [`content`]: Content items and their status lifecycle
//! - [`users`]: Admin user management

mod auth;
mod clients;
mod content;
mod health;
mod users;
mod workspaces;

pub use auth::*;
pub use clients::*;
pub use content::*;
pub use health::*;
pub use users::*;
pub use workspaces::*;
