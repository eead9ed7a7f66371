// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # contentflow-bin
//!
//! CLI binary for the ContentFlow access-control service.
//!
//! - CLI argument parsing with clap
//! - Service runtime orchestration
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! contentflow
//!
//! # Start with custom config
//! contentflow -c /etc/contentflow/config.yaml
//!
//! # Validate configuration
//! contentflow validate --format json
//!
//! # Mint a development token
//! contentflow issue-token --user 11111111-1111-4111-8111-111111111111
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
