//! CLI argument definitions using clap
//!
//! Commands:
//! - idfrecord init --config <path>
//! - idfrecord list --config <path>
//! - idfrecord describe --config <path> --object <name>
//! - idfrecord add --config <path> --file <path>
//! - idfrecord check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// idfrecord - schema-validated records for simulation input objects
#[derive(Parser, Debug)]
#[command(name = "idfrecord")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the schema directory named in the configuration
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./idfrecord.json")]
        config: PathBuf,
    },

    /// List registered object types
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./idfrecord.json")]
        config: PathBuf,
    },

    /// Print one schema table as JSON
    Describe {
        /// Path to configuration file
        #[arg(long, default_value = "./idfrecord.json")]
        config: PathBuf,

        /// Object type name, e.g. `OutdoorAir:Node`
        #[arg(long)]
        object: String,
    },

    /// Add schema tables from a JSON file to the schema directory
    Add {
        /// Path to configuration file
        #[arg(long, default_value = "./idfrecord.json")]
        config: PathBuf,

        /// File holding one table or an array of tables
        #[arg(long)]
        file: PathBuf,
    },

    /// Validate newline-delimited JSON records read from stdin
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./idfrecord.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
