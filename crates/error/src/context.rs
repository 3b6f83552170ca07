//! # Error Contexts
//!
//! Structured metadata attached to errors so callers can report which feature,
//! row or table failed without parsing messages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Context for OVERLAP-2001/2002 (metadata and type probes)
    Metadata { table: String, reason: String },

    /// Context for OVERLAP-3001 (MalformedRow)
    Row {
        /// Zero-based row index after blank rows were dropped
        index: usize,
        missing_cells: Vec<String>,
    },

    /// Context for OVERLAP-1002 (InvalidEntry)
    Entry { index: usize, feature_name: Option<String> },

    /// Context for OVERLAP-4001 (TemplateError)
    Template {
        template: String,
        unresolved: Vec<String>,
    },

    /// Context for OVERLAP-3002/3003 (config errors)
    Config {
        file_path: Option<String>,
        field: Option<String>,
    },

    /// Generic key-value context
    Generic {
        #[serde(flatten)]
        data: std::collections::HashMap<String, serde_json::Value>,
    },
}
