// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ContentFlow Integration Tests
//!
//! Shared fixtures, mock stores and a router harness for the integration
//! suites under `tests/`.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p contentflow-tests
//! cargo test -p contentflow-tests --test integration_auth
//! cargo test -p contentflow-tests --test integration_ownership
//! cargo test -p contentflow-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! - `integration_auth.rs`: Token Verifier and Role Gate through the full router
//! - `integration_ownership.rs`: Ownership Gate, content chain and admin operations
//! - `integration_config.rs`: File formats, placeholders and environment overrides
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use contentflow_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let response = app.get("/api/v1/auth/me", Some(&app.token_for(Ids::ADMIN))).await;
//!     response.assert_ok();
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
}
