//! CLI module for idfrecord
//!
//! Provides command-line interface for:
//! - init: Create the schema directory
//! - list: Print registered object types
//! - describe: Print one schema table
//! - add: Write new schema tables into the schema directory
//! - check: Validate newline-delimited JSON records from stdin

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    add, check, check_requests, describe, init, list, load_schemas, run, run_command,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult, RequestError};
pub use io::{read_requests, write_error_to, write_response, write_response_to, CheckRequest};
