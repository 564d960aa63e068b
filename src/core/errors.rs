//! BW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, BwError>;

/// Top-level error type for BearWatch.
///
/// Access-denied directories and per-entry stat failures during traversal are
/// recovered in place (logged and counted) and intentionally have no variant
/// here; only conditions that reach a caller are modeled.
#[derive(Debug, Error)]
pub enum BwError {
    #[error("[BW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[BW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[BW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[BW-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[BW-3001] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[BW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[BW-3101] report persistence failure at {path}: {details}")]
    ReportPersist { path: PathBuf, details: String },
}

impl BwError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "BW-1001",
            Self::MissingConfig { .. } => "BW-1002",
            Self::ConfigParse { .. } => "BW-1003",
            Self::Serialization { .. } => "BW-2101",
            Self::PermissionDenied { .. } => "BW-3001",
            Self::Io { .. } => "BW-3002",
            Self::ReportPersist { .. } => "BW-3101",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::ReportPersist { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for BwError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for BwError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
