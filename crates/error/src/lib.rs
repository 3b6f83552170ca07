//! # overlap-error
//!
//! Unified error type for the overlap configuration compiler and query engine.
//!
//! Every error carries:
//! - A stable numeric code (OVERLAP-XXXX)
//! - Structured JSON context describing the failing feature or table
//! - An optional hint for the person maintaining the spreadsheet

mod code;
mod context;
mod convert;

pub use code::{ErrorCategory, ErrorCode};
pub use context::ErrorContext;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unified error type for all overlap operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapError {
    /// Numeric error code (e.g., "OVERLAP-2001")
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Structured context for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Suggested fix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl OverlapError {
    /// Create a new error with code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    /// Add structured context
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Top-level payload was neither a single entry nor a sequence of entries.
    pub fn invalid_input_shape(found: &str) -> Self {
        Self::new(
            ErrorCode::InvalidInputShape,
            format!("Unsupported JSON structure: expected object or array, found {}", found),
        )
        .with_hint("Pass a single {\"table_summary\": ...} object or a list of them")
    }

    /// Catalog lookup for a table's geometry metadata came back empty or failed.
    pub fn metadata_not_found(table: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ErrorCode::MetadataNotFound,
            format!("No geometry metadata for '{}': {}", table, reason),
        )
        .with_context(ErrorContext::Metadata {
            table: table.to_string(),
            reason,
        })
    }

    /// Data type probe could not identify the source.
    pub fn type_probe_failure(table: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ErrorCode::TypeProbeFailure,
            format!("Could not determine data type of '{}': {}", table, reason),
        )
        .with_context(ErrorContext::Metadata {
            table: table.to_string(),
            reason,
        })
    }

    /// Returns true if callers are expected to fall back to a default.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.code.category(), ErrorCategory::Input)
    }

    /// Serialize to JSON for machine-readable output
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize OverlapError: {}", e);
            format!(
                r#"{{"code":"{}","message":"Serialization failed"}}"#,
                self.code
            )
        })
    }

    /// Serialize to pretty JSON for logging
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for OverlapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (Hint: {})", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for OverlapError {}

/// Result type alias for overlap operations
pub type Result<T> = std::result::Result<T, OverlapError>;
