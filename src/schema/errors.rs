//! Schema and record error types
//!
//! Record errors (raised by field access and validation):
//! - IDF_UNKNOWN_FIELD
//! - IDF_INVALID_VALUE
//! - IDF_ARITY_MISMATCH
//!
//! Schema errors (raised while loading or registering tables):
//! - IDF_UNKNOWN_OBJECT (REJECT)
//! - IDF_DUPLICATE_OBJECT (REJECT)
//! - IDF_MALFORMED_SCHEMA (FATAL)

use std::fmt;

use thiserror::Error;

use super::types::FieldKind;

/// The rule a value broke
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: FieldKind,
        actual: &'static str,
    },

    #[error("number is not finite")]
    NotFinite,

    #[error("must be >= {minimum}")]
    BelowMinimum { minimum: f64 },

    #[error("must be > {minimum}")]
    NotAboveMinimum { minimum: f64 },

    #[error("must be <= {maximum}")]
    AboveMaximum { maximum: f64 },

    #[error("must be < {maximum}")]
    NotBelowMaximum { maximum: f64 },

    #[error("not one of [{}]", .choices.join(", "))]
    NotAChoice { choices: Vec<String> },

    #[error("'{sentinel}' is not permitted for this field")]
    SentinelNotAllowed { sentinel: &'static str },

    #[error("must not contain '{ch}'")]
    ForbiddenCharacter { ch: char },
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors raised by schema lookup and record writes.
///
/// All of these are caller errors. None are retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("Unknown field '{field}' for object '{object}'")]
    UnknownField { object: String, field: String },

    #[error("Invalid value '{value}' for field '{field}': {rule}")]
    InvalidValue {
        field: String,
        value: String,
        rule: Violation,
    },

    #[error("Extensible group for '{object}' expects {expected} values, got {actual}")]
    ArityMismatch {
        object: String,
        expected: usize,
        actual: usize,
    },

    #[error("Field '{field}' of object '{object}' was already given as '{previous}'")]
    DuplicateField {
        object: String,
        field: String,
        previous: String,
    },
}

impl RecordError {
    pub fn unknown_field(object: impl Into<String>, field: impl Into<String>) -> Self {
        RecordError::UnknownField {
            object: object.into(),
            field: field.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl fmt::Display,
        rule: Violation,
    ) -> Self {
        RecordError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            rule,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::UnknownField { .. } => "IDF_UNKNOWN_FIELD",
            RecordError::InvalidValue { .. } => "IDF_INVALID_VALUE",
            RecordError::ArityMismatch { .. } => "IDF_ARITY_MISMATCH",
            RecordError::DuplicateField { .. } => "IDF_DUPLICATE_FIELD",
        }
    }

    /// Field the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            RecordError::UnknownField { field, .. }
            | RecordError::InvalidValue { field, .. }
            | RecordError::DuplicateField { field, .. } => Some(field),
            RecordError::ArityMismatch { .. } => None,
        }
    }

    /// The violated rule for `InvalidValue`
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            RecordError::InvalidValue { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, process continues
    Reject,
    /// Startup cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema loading error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Object type not registered
    IdfUnknownObject,
    /// Object type registered twice
    IdfDuplicateObject,
    /// Schema file unreadable or structurally invalid
    IdfMalformedSchema,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::IdfUnknownObject => "IDF_UNKNOWN_OBJECT",
            SchemaErrorCode::IdfDuplicateObject => "IDF_DUPLICATE_OBJECT",
            SchemaErrorCode::IdfMalformedSchema => "IDF_MALFORMED_SCHEMA",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::IdfMalformedSchema => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    object: Option<String>,
}

impl SchemaError {
    pub fn unknown_object(object: impl Into<String>) -> Self {
        let object = object.into();
        Self {
            code: SchemaErrorCode::IdfUnknownObject,
            message: format!("Object type '{}' is not registered", object),
            object: Some(object),
        }
    }

    pub fn duplicate_object(object: impl Into<String>) -> Self {
        let object = object.into();
        Self {
            code: SchemaErrorCode::IdfDuplicateObject,
            message: format!("Object type '{}' is already registered", object),
            object: Some(object),
        }
    }

    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::IdfMalformedSchema,
            message: format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            object: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Object type name if applicable
    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
