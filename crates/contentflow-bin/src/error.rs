// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the `contentflow` binary.
//!
//! Every failure maps to a sysexits-style process exit code so that service
//! managers can tell a bad config file from a store outage.

use thiserror::Error;

/// Result type alias for binary operations.
pub type BinResult<T> = Result<T, BinError>;

/// Process exit codes.
pub mod exit {
    /// Bad command-line usage (`EX_USAGE`).
    pub const USAGE: i32 = 64;
    /// A required service is unavailable (`EX_UNAVAILABLE`).
    pub const UNAVAILABLE: i32 = 69;
    /// Internal failure (`EX_SOFTWARE`).
    pub const SOFTWARE: i32 = 70;
    /// I/O failure (`EX_IOERR`).
    pub const IO: i32 = 74;
    /// Configuration problem (`EX_CONFIG`).
    pub const CONFIG: i32 = 78;
}

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Load(#[from] contentflow_config::ConfigError),

    /// The loaded configuration cannot be used as is.
    #[error("configuration: {0}")]
    Settings(String),

    /// Bad command-line input.
    #[error("{0}")]
    Usage(String),

    /// The store could not be reached or seeded.
    #[error("store: {0}")]
    Store(#[from] contentflow_core::StoreError),

    /// The HTTP server failed to start or stopped with an error.
    #[error("server: {0}")]
    Server(#[from] contentflow_api::ApiError),

    /// Anything else that went wrong while running.
    #[error("{0}")]
    Runtime(String),

    /// Local I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Another error with a description of what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// The underlying failure.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// A configuration value that cannot be used.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Invalid command-line input.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// A runtime failure.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Wraps the error with what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Load(e) if e.is_file_error() => exit::IO,
            Self::Load(_) | Self::Settings(_) => exit::CONFIG,
            Self::Usage(_) => exit::USAGE,
            Self::Store(_) => exit::UNAVAILABLE,
            Self::Server(_) | Self::Runtime(_) => exit::SOFTWARE,
            Self::Io(_) => exit::IO,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

/// Prints the error and its causes to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

/// Prints the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}
