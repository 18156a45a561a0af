//! Structured error output.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Document Errors (exit code 3) ===
    DocumentNotFound,
    VaultNotFound,

    // === Remote Errors (exit code 5) ===
    RemoteUnavailable,
    NoRemoteSource,

    // === Validation Errors (exit code 4) ===
    ValidationFailed,
    InvalidRepo,
    InvalidFormat,

    // === Config Errors (exit code 7) ===
    ConfigError,

    // === I/O Errors (exit code 8) ===
    IoError,
    JsonError,
    YamlError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Self::VaultNotFound => "VAULT_NOT_FOUND",
            Self::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            Self::NoRemoteSource => "NO_REMOTE_SOURCE",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidRepo => "INVALID_REPO",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
        }
    }

    /// Whether retrying (after waiting or fixing input) might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable | Self::ValidationFailed | Self::InvalidRepo
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 3: Document errors
    /// - 4: Validation errors
    /// - 5: Remote errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DocumentNotFound | Self::VaultNotFound => 3,
            Self::ValidationFailed | Self::InvalidRepo | Self::InvalidFormat => 4,
            Self::RemoteUnavailable | Self::NoRemoteSource => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `SyncError`.
    #[must_use]
    pub fn from_error(err: &SyncError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Convert to the JSON envelope written to stderr.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Human-readable rendering, optionally colored.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &SyncError) -> (ErrorCode, Option<Value>) {
        match err {
            SyncError::DocumentNotFound { path } => (
                ErrorCode::DocumentNotFound,
                Some(json!({ "path": path.display().to_string() })),
            ),
            SyncError::VaultNotFound { path } => (
                ErrorCode::VaultNotFound,
                Some(json!({ "path": path.display().to_string() })),
            ),
            SyncError::RemoteUnavailable {
                category,
                repo,
                reason,
            } => (
                ErrorCode::RemoteUnavailable,
                Some(json!({ "category": category, "repo": repo, "reason": reason })),
            ),
            SyncError::NoRemoteSource => (ErrorCode::NoRemoteSource, None),
            SyncError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({ "field": field, "reason": reason })),
            ),
            SyncError::InvalidRepo { value } => {
                (ErrorCode::InvalidRepo, Some(json!({ "value": value })))
            }
            SyncError::InvalidFormat { value } => (
                ErrorCode::InvalidFormat,
                Some(json!({ "value": value, "valid": ["tasks", "dataview"] })),
            ),
            SyncError::Config(_) => (ErrorCode::ConfigError, None),
            SyncError::Io(_) => (ErrorCode::IoError, None),
            SyncError::Json(_) => (ErrorCode::JsonError, None),
            SyncError::Yaml(_) => (ErrorCode::YamlError, None),
        }
    }
}
