//! DCAP-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DcapError>;

/// Top-level error type for deferred capture.
#[derive(Debug, Error)]
pub enum DcapError {
    #[error("[DCAP-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DCAP-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[DCAP-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DCAP-2001] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[DCAP-2002] identity resolution failed: {details}")]
    Identity { details: String },

    #[error("[DCAP-2101] sink {sink} rejected {operation}: {details}")]
    Sink {
        sink: &'static str,
        operation: &'static str,
        details: String,
    },

    #[error("[DCAP-2102] capture backlog full; {dropped} hits discarded")]
    BacklogOverflow { dropped: u64 },

    #[error("[DCAP-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DCAP-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl DcapError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DCAP-1001",
            Self::MissingConfig { .. } => "DCAP-1002",
            Self::ConfigParse { .. } => "DCAP-1003",
            Self::Serialization { .. } => "DCAP-2001",
            Self::Identity { .. } => "DCAP-2002",
            Self::Sink { .. } => "DCAP-2101",
            Self::BacklogOverflow { .. } => "DCAP-2102",
            Self::Io { .. } => "DCAP-3001",
            Self::Runtime { .. } => "DCAP-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Sink { .. } | Self::Identity { .. } | Self::Runtime { .. }
        )
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

impl From<serde_json::Error> for DcapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for DcapError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
