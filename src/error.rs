//! Error types for json2parquet
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for json2parquet
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("Schema resolution failed: {message}")]
    SchemaResolution { message: String },

    #[error("Invalid type descriptor: '{value}'")]
    InvalidType { value: String },

    #[error("Unknown source type '{source_type}' for column '{column}'")]
    UnknownSourceType { column: String, source_type: String },

    // ============================================================================
    // Conversion Errors
    // ============================================================================
    #[error("Cannot coerce column '{column}' at row {row}: {message}")]
    TypeCoercion {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Failed to decode input: {message}")]
    Decode { message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Catalog Errors
    // ============================================================================
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schema resolution error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaResolution {
            message: message.into(),
        }
    }

    /// Create a type coercion error for a cell
    pub fn coercion(column: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        Self::TypeCoercion {
            column: column.into(),
            row,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Row index of the offending value, for coercion failures
    pub fn row(&self) -> Option<usize> {
        match self {
            Error::TypeCoercion { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// Result type alias for json2parquet
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::coercion("foo", 3, "expected integer, got \"x\"");
        assert_eq!(
            err.to_string(),
            "Cannot coerce column 'foo' at row 3: expected integer, got \"x\""
        );

        let err = Error::UnknownSourceType {
            column: "geo".to_string(),
            source_type: "GEOMETRY".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown source type 'GEOMETRY' for column 'geo'"
        );
    }

    #[test]
    fn test_row() {
        assert_eq!(Error::coercion("foo", 7, "bad").row(), Some(7));
        assert_eq!(Error::schema("bad").row(), None);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
