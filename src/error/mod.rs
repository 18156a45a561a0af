//! Error types and handling for `ghtasks`.
//!
//! The reconciliation core never fails: unparseable lines and frontmatter
//! resolve to `None`. Errors only arise at the collaborator boundary
//! (document store, remote source, configuration) and are isolated per
//! document and per category by the sync orchestrator.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output (see [`structured`])

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ghtasks` operations.
#[derive(Error, Debug)]
pub enum SyncError {
    // === Document Errors ===
    /// Document does not exist in the store.
    #[error("Document not found: {path}")]
    DocumentNotFound { path: PathBuf },

    /// Vault root directory does not exist.
    #[error("Vault not found at '{path}'")]
    VaultNotFound { path: PathBuf },

    // === Remote Errors ===
    /// A remote category could not be fetched.
    #[error("Remote {category} unavailable for {repo}: {reason}")]
    RemoteUnavailable {
        category: String,
        repo: String,
        reason: String,
    },

    /// Remote snapshot was not supplied.
    #[error("No remote snapshot configured")]
    NoRemoteSource,

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Repository identifier is not of the form `owner/repo`.
    #[error("Invalid repository '{value}': expected owner/repo")]
    InvalidRepo { value: String },

    /// Unknown task line format.
    #[error("Invalid task format: {value}")]
    InvalidFormat { value: String },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SyncError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DocumentNotFound { .. }
                | Self::VaultNotFound { .. }
                | Self::NoRemoteSource
                | Self::Validation { .. }
                | Self::InvalidRepo { .. }
                | Self::InvalidFormat { .. }
                | Self::Config(_)
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DocumentNotFound { .. } => {
                Some("Create the note or point tasks-note at an existing one")
            }
            Self::VaultNotFound { .. } => Some("Pass --vault <DIR> or set GHT_VAULT"),
            Self::NoRemoteSource => Some("Pass --snapshot <FILE> or set GHT_SNAPSHOT"),
            Self::InvalidRepo { .. } => Some("Use the form owner/repo, e.g. rust-lang/rust"),
            Self::InvalidFormat { .. } => Some("Valid formats: tasks, dataview"),
            Self::RemoteUnavailable { .. } => Some("Retry once the remote data is available"),
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. }
            | Self::InvalidRepo { .. }
            | Self::InvalidFormat { .. }
            | Self::Config(_) => 2,
            _ => 1,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a remote failure for one fetch category.
    #[must_use]
    pub fn remote(
        category: impl Into<String>,
        repo: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RemoteUnavailable {
            category: category.into(),
            repo: repo.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;
