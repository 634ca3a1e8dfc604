//! idfrecord - schema-validated records for simulation input objects
//!
//! A `SchemaTable` describes one object type. A `Record` holds the values
//! of one instance and validates every write against its table.

pub mod cli;
pub mod observability;
pub mod record;
pub mod schema;

pub use record::{ExtensibleGroup, Record};
pub use schema::{
    FieldDescriptor, FieldKind, RecordError, RecordResult, SchemaError, SchemaLoader,
    SchemaTable, Value,
};
