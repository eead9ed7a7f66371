// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while loading or validating ContentFlow configuration.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file does not exist.
    #[error("config file not found: {}", .path.display())]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// Requested path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The extension maps to no known format.
    #[error("unsupported config format '{0}' (expected yaml, yml, toml or json)")]
    UnsupportedFormat(String),

    /// The document is not valid for its format or does not match the schema.
    #[error("cannot parse {}: {message}", origin(.path.as_deref()))]
    Parse {
        /// Source file, `None` for inline documents.
        path: Option<PathBuf>,
        /// Parser message.
        message: String,
    },

    /// A required setting is absent.
    #[error("{field} is required")]
    MissingField {
        /// Dotted setting name, e.g. `jwt.secret`.
        field: String,
    },

    /// A setting is present but unusable.
    #[error("{field} {reason}")]
    Invalid {
        /// Dotted setting name.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `CONTENTFLOW_*` override could not be applied.
    #[error("environment variable {name}: {reason}")]
    Env {
        /// Variable name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

fn origin(path: Option<&Path>) -> String {
    path.map_or_else(|| "inline config".to_string(), |p| p.display().to_string())
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(message: impl ToString) -> Self {
        Self::Parse {
            path: None,
            message: message.to_string(),
        }
    }

    /// Attaches the source file to a parse error.
    pub(crate) fn in_file(self, file: &Path) -> Self {
        match self {
            Self::Parse { path: None, message } => Self::Parse {
                path: Some(file.to_path_buf()),
                message,
            },
            other => other,
        }
    }

    /// A required setting is absent.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// A setting failed validation.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` when the file itself could not be opened.
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Read { .. })
    }

    /// Returns the offending setting for schema failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_setting() {
        let err = ConfigError::invalid("api.port", "cannot be zero");
        assert_eq!(err.to_string(), "api.port cannot be zero");
        assert_eq!(err.field(), Some("api.port"));

        let err = ConfigError::missing("store.url");
        assert_eq!(err.to_string(), "store.url is required");
        assert_eq!(err.field(), Some("store.url"));
    }

    #[test]
    fn test_parse_origin() {
        let err = ConfigError::parse("bad indent");
        assert_eq!(err.to_string(), "cannot parse inline config: bad indent");

        let err = err.in_file(Path::new("contentflow.yaml"));
        assert_eq!(
            err.to_string(),
            "cannot parse contentflow.yaml: bad indent"
        );
        assert!(err.field().is_none());
    }

    #[test]
    fn test_file_errors() {
        let err = ConfigError::read(
            "contentflow.yaml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_file_error());
        assert!(ConfigError::not_found("contentflow.yaml").is_file_error());
        assert!(!ConfigError::missing("jwt.secret").is_file_error());
    }
}
