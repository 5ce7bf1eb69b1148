//! CLI-specific error types
//!
//! CLI errors end the process with a non-zero exit code. Table failures
//! during `query` are not CLI errors: they become error responses.

use std::fmt;
use std::io;

use crate::errors::TableError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Document file error
    DataError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Request could not be decoded or prepared
    RequestError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TABLE_CLI_CONFIG_ERROR",
            Self::DataError => "TABLE_CLI_DATA_ERROR",
            Self::IoError => "TABLE_CLI_IO_ERROR",
            Self::RequestError => "TABLE_CLI_REQUEST_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn data_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DataError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn request_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RequestError, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TableError> for CliError {
    fn from(e: TableError) -> Self {
        Self::request_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
