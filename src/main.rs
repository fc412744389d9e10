//! # Bookbinder CLI
//!
//! This is the binary entry point for the `bookbinder` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Executing the appropriate command and letting `anyhow` report any
//!   error, which exits with status 1.
//!
//! The core application logic lives in the `bookbinder` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
