//! JSON I/O handling for CLI
//!
//! - Input: newline-delimited JSON requests via stdin
//! - Output: one JSON object per line via stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::{CliError, CliResult};

/// One record submitted to `check`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckRequest {
    pub object: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub extensibles: Vec<Vec<Value>>,
}

/// Read non-blank request lines from a reader.
///
/// Lines are returned unparsed so a malformed line fails only itself.
pub fn read_requests<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<String>> {
    reader
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
}

/// Write a success response
pub fn write_response_to<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error_to<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_response_to(&mut io::stdout().lock(), data)
}
