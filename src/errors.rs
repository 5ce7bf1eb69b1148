//! Error types for the table query pipeline
//!
//! Error codes:
//! - TABLE_CONFIGURATION (column cannot be resolved, skipped by default)
//! - TABLE_STORE_EXECUTION_FAILED (store round-trip failed)
//! - TABLE_INVALID_PATTERN (regex predicate cannot be compiled)
//! - TABLE_CALLBACK_FAILED (caller-supplied rule failed)
//! - TABLE_INVALID_REQUEST (request cannot be decoded)
//! - TABLE_UNSUPPORTED_FEATURE (capability not available on document stores)

use thiserror::Error;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while preparing, executing or transforming a table query
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// A requested sort/filter references a column with no resolvable name
    #[error("Column at index {index} has no resolvable name")]
    Configuration { index: usize },

    /// The underlying store call failed
    #[error("Store execution failed: {0}")]
    StoreExecution(String),

    /// A regex predicate could not be compiled by the store
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A custom filter, order or limit callback failed
    #[error("Callback for '{target}' failed: {reason}")]
    Callback { target: String, reason: String },

    /// The request could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A capability the document store cannot express
    #[error("Unsupported feature: {0}")]
    Unsupported(&'static str),
}

impl TableError {
    /// Create a store execution error
    pub fn store(reason: impl Into<String>) -> Self {
        TableError::StoreExecution(reason.into())
    }

    /// Create a callback error for the given column or hook name
    pub fn callback(target: impl Into<String>, reason: impl Into<String>) -> Self {
        TableError::Callback {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            TableError::Configuration { .. } => "TABLE_CONFIGURATION",
            TableError::StoreExecution(_) => "TABLE_STORE_EXECUTION_FAILED",
            TableError::InvalidPattern { .. } => "TABLE_INVALID_PATTERN",
            TableError::Callback { .. } => "TABLE_CALLBACK_FAILED",
            TableError::InvalidRequest(_) => "TABLE_INVALID_REQUEST",
            TableError::Unsupported(_) => "TABLE_UNSUPPORTED_FEATURE",
        }
    }

    /// Returns true if the error came from the store round-trip
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            TableError::StoreExecution(_) | TableError::InvalidPattern { .. }
        )
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::InvalidRequest(err.to_string())
    }
}
