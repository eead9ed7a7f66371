// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persistence error types.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`Store`](crate::Store) implementation.
///
/// A missing row is not an error; lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// The backend answered with a non-success HTTP status.
    #[error("Store returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// A row could not be decoded into the expected record.
    #[error("Failed to decode {table} row: {message}")]
    Decode {
        /// Table the row came from.
        table: String,
        /// Error message.
        message: String,
    },

    /// The query itself is malformed.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Error message.
        message: String,
    },

    /// A write collided with an existing row.
    #[error("Conflict in {table}: {message}")]
    Conflict {
        /// Table written to.
        table: String,
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    pub fn decode(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable { .. } => true,
            StoreError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StoreError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => StoreError::unavailable(err.to_string()),
        }
    }
}
