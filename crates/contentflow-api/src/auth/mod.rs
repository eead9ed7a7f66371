// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - JWT token management and validation
//! - The per-request authentication context
//! - Resource ownership rules

mod claims;
mod context;
mod jwt;
mod ownership;

pub use claims::Claims;
pub use context::AuthContext;
pub use jwt::{JwtConfig, JwtManager};
pub use ownership::{OwnershipGuard, OwnershipTarget};
