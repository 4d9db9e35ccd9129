//! CLI module for indexprop
//!
//! A small driver that declares one demo property and runs statements against it, for manual checks of key
//! handling, broadcasting and error messages.
//!
//! ## Commands
//!
//! - `range [--start N] --stop N [--fill V] [--doc TEXT] STMT...` - integer cells over `[start, stop)`
//! - `container --keys K,K,... [--fill V] [--doc TEXT] STMT...` - cells restricted to the listed keys
//!
//! ## Modules
//!
//! - `statements` - the statement language
//! - `commands` - demo properties and the statement runner
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod statements;

use std::process;

use clap::{Parser, Subcommand};
use indexprop_core::Key;
use thiserror::Error;

use crate::version::INDEXPROP_VERSION;
use statements::Statement;

// ============================================================================
// CLI Error handling
// ============================================================================

/// A failed command. `message` is the rendered report; the process exits with status 1.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Exercise indexed properties from the command line
#[derive(Parser, Debug)]
#[command(name = "indexprop")]
#[command(version = INDEXPROP_VERSION)]
#[command(about = "Exercise indexed properties from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Integer cells indexed by [start, stop)
    Range {
        /// First index
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        start: i64,

        /// One past the last index
        #[arg(long, allow_negative_numbers = true)]
        stop: i64,

        /// Initial value of every cell, restored on delete
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        fill: i64,

        /// Documentation for the property
        #[arg(long)]
        doc: Option<String>,

        /// Statements, run in order (`get KEY`, `set KEY = VALUE`, `del KEY`, `len`, ...)
        #[arg(value_name = "STMT", allow_hyphen_values = true)]
        statements: Vec<Statement>,
    },
    /// Integer cells restricted to a fixed list of keys
    Container {
        /// Legal keys, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        keys: Vec<Key>,

        /// Initial value of every cell, restored on delete
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        fill: i64,

        /// Documentation for the property
        #[arg(long)]
        doc: Option<String>,

        /// Statements, run in order (`get KEY`, `set KEY = VALUE`, `del KEY`, `len`, ...)
        #[arg(value_name = "STMT", allow_hyphen_values = true)]
        statements: Vec<Statement>,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("{e}");
        process::exit(1);
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Range {
            start,
            stop,
            fill,
            doc,
            statements,
        } => commands::range(start, stop, fill, doc, &statements),
        Command::Container {
            keys,
            fill,
            doc,
            statements,
        } => commands::container(keys, fill, doc, &statements),
    }
}
