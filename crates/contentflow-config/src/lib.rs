// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # contentflow-config
//!
//! Configuration management for the ContentFlow access-control service.
//!
//! ## Features
//!
//! - **Schema Definition**: API, JWT, store and logging sections with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `CONTENTFLOW_*` variables and `${VAR:default}` placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use contentflow_config::load_config;
//!
//! let config = load_config("contentflow.yaml").unwrap();
//! println!("Listening on {}", config.api.socket_addr());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, ConfigLoaderBuilder, EnvSource, load_config, load_config_str};
pub use schema::{
    ApiConfig, ContentFlowConfig, CorsConfig, JwtConfig, LogFormat, LogLevel, LoggingConfig,
    SecretValue, StoreBackend, StoreConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
