//! Schema tables and field validation
//!
//! A schema table is static, shared metadata for one object type. Records
//! bind to a table and route every write through the validator.
//!
//! # Design Principles
//!
//! - Tables are immutable after construction and shared through `Arc`
//! - Validation is a pure function of descriptor and value
//! - Missing values (`None`) are never validated
//! - Numeric text is coerced to the declared kind

mod errors;
mod loader;
mod types;
mod validator;
mod value;

pub use errors::{
    RecordError, RecordResult, SchemaError, SchemaErrorCode, SchemaResult, Severity, Violation,
};
pub use loader::SchemaLoader;
pub use types::{FieldDescriptor, FieldKind, RecordFormat, SchemaTable};
pub use validator::check_value;
pub use value::{Value, AUTOCALCULATE, AUTOSIZE};

pub(crate) use value::json_type_name;
