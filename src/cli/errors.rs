//! CLI-specific error types
//!
//! `CliError` ends the process. `RequestError` fails a single `check`
//! request and is reported inline without stopping the batch.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::schema::{RecordError, SchemaError};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Schema directory already exists
    AlreadyInitialized,
    /// Schema directory missing
    NotInitialized,
    /// Schema tables could not be loaded
    SchemaLoadFailed,
    /// Object type not registered
    UnknownObject,
    /// Schema table refused by `add`
    SchemaRejected,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "IDF_CLI_CONFIG_ERROR",
            Self::IoError => "IDF_CLI_IO_ERROR",
            Self::AlreadyInitialized => "IDF_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "IDF_CLI_NOT_INITIALIZED",
            Self::SchemaLoadFailed => "IDF_CLI_SCHEMA_LOAD_FAILED",
            Self::UnknownObject => "IDF_CLI_UNKNOWN_OBJECT",
            Self::SchemaRejected => "IDF_CLI_SCHEMA_REJECTED",
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

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Schema directory already exists",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Schema directory not found. Run 'idfrecord init' first.",
        )
    }

    pub fn schema_load_failed(err: &SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaLoadFailed, err.to_string())
    }

    pub fn unknown_object(err: &SchemaError) -> Self {
        Self::new(CliErrorCode::UnknownObject, err.message())
    }

    pub fn schema_rejected(err: &SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaRejected, err.to_string())
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

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

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// Failure of one `check` request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("{}", .0.message())]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Record '{object}' has fewer than {min_fields} leading fields populated")]
    Incomplete { object: String, min_fields: usize },

    #[error("Record '{object}' is missing required fields: {}", .fields.join(", "))]
    MissingRequired { object: String, fields: Vec<String> },
}

impl RequestError {
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::Malformed(_) => "IDF_CLI_BAD_REQUEST",
            RequestError::Schema(e) => e.code().code(),
            RequestError::Record(e) => e.code(),
            RequestError::Incomplete { .. } => "IDF_INCOMPLETE_RECORD",
            RequestError::MissingRequired { .. } => "IDF_MISSING_REQUIRED",
        }
    }
}
