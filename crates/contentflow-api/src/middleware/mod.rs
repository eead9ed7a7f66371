// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! The three gates run strictly in sequence; each one either forwards the
//! request or answers with a terminal JSON error:
//!
//! - [`AuthLayer`]: Token Verifier
//! - [`RoleLayer`]: Role Gate
//! - [`OwnershipLayer`]: Ownership Gate

mod auth;
mod ownership;
mod role;

pub use auth::{AuthLayer, AuthMiddleware, authenticate};
pub use ownership::{CLIENT_PARAM, OwnershipLayer, OwnershipMiddleware, WORKSPACE_PARAM};
pub use role::{RoleLayer, RoleMiddleware};
