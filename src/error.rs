//! Error types for the Tessera library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`TesseraError`] enum.
//!
//! # Examples
//!
//! ```
//! use tessera::error::{Result, TesseraError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TesseraError::schema("unknown field: colour"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Tessera operations.
#[derive(Error, Debug)]
pub enum TesseraError {
    /// I/O errors (configuration files, store backends)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Schema-related errors (unknown tables or fields, invalid field names)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Query-related errors (bad terms, unsupported operands)
    #[error("Query error: {0}")]
    Query(String),

    /// Storage-related errors raised by a backing store
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored key, posting or record could not be decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TesseraError.
pub type Result<T> = std::result::Result<T, TesseraError>;

impl TesseraError {
    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        TesseraError::Schema(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        TesseraError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TesseraError::Storage(msg.into())
    }

    /// Create a new encoding error.
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        TesseraError::Encoding(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        TesseraError::Cancelled(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TesseraError::Other(format!("Invalid configuration: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TesseraError::schema("unknown field: body");
        assert_eq!(error.to_string(), "Schema error: unknown field: body");

        let error = TesseraError::query("not an integer: abc");
        assert_eq!(error.to_string(), "Query error: not an integer: abc");

        let error = TesseraError::invalid_config("prefix_scan_limit must be positive");
        assert_eq!(
            error.to_string(),
            "Error: Invalid configuration: prefix_scan_limit must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let tessera_error = TesseraError::from(io_error);

        match tessera_error {
            TesseraError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
