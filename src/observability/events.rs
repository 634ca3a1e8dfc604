//! Observable events
//!
//! Events are explicit and typed. The record core emits none; they come
//! from schema loading and the command-line front end.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file read and validated
    ConfigLoaded,
    /// Schema directory created
    SchemaDirCreated,
    /// Schema tables loaded from disk
    SchemasLoaded,
    /// Schema loading failed (FATAL)
    SchemaLoadFailed,
    /// Schema table written to the schema directory
    SchemaAdded,
    /// Batch check started
    CheckBegin,
    /// Batch check finished
    CheckComplete,
    /// Request produced a valid record
    RecordAccepted,
    /// Request failed validation
    RecordRejected,
    /// Request line could not be parsed
    RequestMalformed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaDirCreated => "SCHEMA_DIR_CREATED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaLoadFailed => "SCHEMA_LOAD_FAILED",
            Event::SchemaAdded => "SCHEMA_ADDED",
            Event::CheckBegin => "CHECK_BEGIN",
            Event::CheckComplete => "CHECK_COMPLETE",
            Event::RecordAccepted => "RECORD_ACCEPTED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RequestMalformed => "REQUEST_MALFORMED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
