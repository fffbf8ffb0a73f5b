// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Location \"{name}\" not found in configuration (available: {available})")]
    UnknownLocation { name: String, available: String },

    #[error("Path \"{path}\" escapes the root of location \"{location}\"")]
    PathEscape { location: String, path: String },

    #[error("Mixed sensitivity: {0}")]
    MixedSensitivity(String),

    #[error("Ambiguous directory matching: {0}")]
    AmbiguousMatch(String),

    #[error("{0} requires encryption, but no [gpg] section is configured")]
    MissingEncryptionConfig(String),

    #[error("{tool} failed: {detail}")]
    ExternalPrimitive { tool: String, detail: String },

    #[error("Interrupted by user")]
    Cancelled,
}

impl SyncError {
    /// Errors that are detected while planning and abort the whole run
    /// before any external primitive is invoked.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SyncError::Parse(_)
                | SyncError::Config(_)
                | SyncError::UnknownLocation { .. }
                | SyncError::PathEscape { .. }
                | SyncError::MixedSensitivity(_)
                | SyncError::AmbiguousMatch(_)
                | SyncError::MissingEncryptionConfig(_)
        )
    }

    pub(crate) fn external(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        SyncError::ExternalPrimitive {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}
