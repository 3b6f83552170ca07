use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following OVERLAP-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Input shape errors (fatal for a batch)
/// - **2000-2999**: Metadata resolution errors (recoverable)
/// - **3000-3999**: Spreadsheet/configuration errors
/// - **4000-4999**: Query generation errors
/// - **5000-5999**: Internal/System errors
///
/// Codes are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    // === Input Errors (1000-1999) ===
    /// OVERLAP-1001: Payload is neither an entry nor a list of entries
    InvalidInputShape = 1001,
    /// OVERLAP-1002: Entry could not be decoded
    InvalidEntry = 1002,

    // === Metadata Errors (2000-2999) ===
    /// OVERLAP-2001: Geometry column or SRID lookup failed
    MetadataNotFound = 2001,
    /// OVERLAP-2002: Data type probe failed
    TypeProbeFailure = 2002,
    /// OVERLAP-2003: Collaborator failed to execute a query
    QueryExecution = 2003,

    // === Configuration Errors (3000-3999) ===
    /// OVERLAP-3001: Row is missing required cells
    MalformedRow = 3001,
    /// OVERLAP-3002: Invalid YAML
    InvalidYaml = 3002,
    /// OVERLAP-3003: Configuration failed validation
    InvalidConfig = 3003,

    // === Query Generation Errors (4000-4999) ===
    /// OVERLAP-4001: Template placeholder left unresolved
    TemplateError = 4001,
    /// OVERLAP-4002: Identifier rejected by sanitizer
    InvalidIdentifier = 4002,

    // === Internal Errors (5000-5999) ===
    /// OVERLAP-5001: Unexpected internal state
    Internal = 5001,
    /// OVERLAP-5002: Serialization/deserialization failed
    SerializationFailed = 5002,
    /// OVERLAP-5003: File system error
    Io = 5003,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "OVERLAP-2001")
    pub fn as_str(&self) -> String {
        format!("OVERLAP-{:04}", self.as_u16())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Input,
            2000..=2999 => ErrorCategory::Metadata,
            3000..=3999 => ErrorCategory::Config,
            4000..=4999 => ErrorCategory::Query,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("OVERLAP-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::InvalidInputShape),
            1002 => Ok(Self::InvalidEntry),
            2001 => Ok(Self::MetadataNotFound),
            2002 => Ok(Self::TypeProbeFailure),
            2003 => Ok(Self::QueryExecution),
            3001 => Ok(Self::MalformedRow),
            3002 => Ok(Self::InvalidYaml),
            3003 => Ok(Self::InvalidConfig),
            4001 => Ok(Self::TemplateError),
            4002 => Ok(Self::InvalidIdentifier),
            5001 => Ok(Self::Internal),
            5002 => Ok(Self::SerializationFailed),
            5003 => Ok(Self::Io),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category, used for exit-code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Input,
    Metadata,
    Config,
    Query,
    Internal,
}
