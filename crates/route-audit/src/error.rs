//! Error types for the route audit pipeline.
//!
//! Every fatal condition of an audit run maps onto one [`AuditError`]
//! variant. Empty tables and zero reporting counts are not errors and never
//! surface here.
//!
//! Errors are serializable so the CLI can emit them inside a JSON report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// An input table does not exist at the configured location.
    #[error("Input file for the {table} table not found: {}", path.display())]
    InputNotFound { table: String, path: PathBuf },

    /// A required key column is missing from a loaded table.
    #[error("Column '{column}' not found in the {table} table")]
    ColumnNotFound { table: String, column: String },

    /// A key column holds values that cannot be read as integer airport ids.
    #[error("Column '{column}' in the {table} table is not integer-valued: {reason}")]
    InvalidKeyColumn {
        table: String,
        column: String,
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing one of the audit outputs failed.
    #[error("Failed to write output '{file}': {reason}")]
    OutputFailed { file: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AuditError>,
    },
}

impl AuditError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AuditError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in JSON output and for exit handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound { .. } => "INPUT_NOT_FOUND",
            Self::ColumnNotFound { .. } => "COLUMN_NOT_FOUND",
            Self::InvalidKeyColumn { .. } => "INVALID_KEY_COLUMN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::OutputFailed { .. } => "OUTPUT_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True when the error was raised while reading inputs, before any
    /// output could have been produced.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::InputNotFound { .. }
            | Self::ColumnNotFound { .. }
            | Self::InvalidKeyColumn { .. } => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AuditError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AuditError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = AuditError::ColumnNotFound {
            table: "reporting".to_string(),
            column: "ORIGIN_AIRPORT_ID".to_string(),
        };
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert_eq!(
            AuditError::InvalidConfig("x".to_string()).error_code(),
            "INVALID_CONFIG"
        );
    }

    #[test]
    fn test_input_not_found_message() {
        let err = AuditError::InputNotFound {
            table: "marketing".to_string(),
            path: PathBuf::from("/data/T_ONTIME_MARKETING.csv"),
        };
        let msg = err.to_string();
        assert!(msg.contains("marketing"));
        assert!(msg.contains("T_ONTIME_MARKETING.csv"));
    }

    #[test]
    fn test_is_input_error() {
        let err = AuditError::InputNotFound {
            table: "reporting".to_string(),
            path: PathBuf::from("missing.csv"),
        };
        assert!(err.is_input_error());
        assert!(err.with_context("Loading tables").is_input_error());

        let err = AuditError::OutputFailed {
            file: "a.csv".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = AuditError::ColumnNotFound {
            table: "marketing".to_string(),
            column: "DEST_AIRPORT_ID".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("DEST_AIRPORT_ID"));
    }

    #[test]
    fn test_with_context() {
        let error = AuditError::InvalidConfig("bad".to_string()).with_context("During setup");
        assert!(error.to_string().contains("During setup"));
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }
}
