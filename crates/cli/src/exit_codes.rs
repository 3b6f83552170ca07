//! Structured exit codes for machine-readable error handling.
//!
//! These codes let batch scripts tell a bad spreadsheet apart from a bad
//! settings file or a partially built payload.

/// Success (standard convention)
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error (fallback for unknown errors)
pub const GENERAL_ERROR: i32 = 1;

/// CLI usage error (invalid arguments, missing flags)
pub const USAGE_ERROR: i32 = 2;

/// Configuration error (settings or profile file unreadable or invalid)
pub const CONFIG_ERROR: i32 = 3;

/// Input error (payload is not an entry or a list of entries)
pub const INPUT_ERROR: i32 = 4;

/// Metadata error (catalog or type probe failed without a fallback)
pub const METADATA_ERROR: i32 = 5;

/// Query error (template could not be rendered, unsafe identifier)
pub const QUERY_ERROR: i32 = 6;

/// Partial failure (some entries were built, others were skipped)
pub const PARTIAL_FAILURE: i32 = 8;
