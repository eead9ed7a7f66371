// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # contentflow-api
//!
//! HTTP API server for the ContentFlow content-management backend.
//!
//! Every protected route runs behind up to three request-pipeline stages,
//! strictly in this order:
//!
//! 1. **Token Verifier** ([`middleware::AuthLayer`]): bearer JWT, then the
//!    caller's user record.
//! 2. **Role Gate** ([`middleware::RoleLayer`]): flat allow-list of roles.
//! 3. **Ownership Gate** ([`middleware::OwnershipLayer`]): workspace and
//!    client ownership taken from the route path.
//!
//! A failing stage answers with `{"error": CODE, "message": text}` and the
//! remaining stages never run.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use config::{ApiConfig, CorsConfig};
pub use contentflow_core::Role;
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
