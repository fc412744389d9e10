//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `bookbinder` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the global
//!   flags and calls into the `bookbinder` library.
//!
//! The helpers below are shared by composition: commands call them rather
//! than inheriting from a common base.

pub mod check_for_changes;
pub mod fetch;
pub mod tag;
pub mod update_local_doc_repos;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use bookbinder::config::{self, Configuration};
use bookbinder::context::RunContext;
use bookbinder::output::OutputConfig;
use bookbinder::repository::Transport;
use bookbinder::suggestions;

/// Flags every subcommand accepts.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub book_dir: PathBuf,
    pub github_token: Option<String>,
    pub color: String,
}

impl GlobalArgs {
    pub fn context(&self) -> RunContext {
        let book_dir = std::path::absolute(&self.book_dir).unwrap_or_else(|_| self.book_dir.clone());
        RunContext::for_book_dir(book_dir)
    }

    pub fn output(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }
}

/// Read the book's `config.yml`.
pub fn load_config(context: &RunContext) -> Result<Configuration> {
    let path = context.config_path();
    if !path.exists() {
        return Err(config_not_found(&path));
    }
    config::from_file(&path).map_err(suggestions::for_cli)
}

fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "The configuration file specified does not exist. Please create a config YAML file at {path}\n\n\
         hint: Run bookbinder from inside your book directory\n\
         hint: Use --book-dir to point at the book",
        path = path.display()
    )
}

/// Real transport, authenticated with the token when one was given.
pub fn transport(globals: &GlobalArgs) -> Result<Transport> {
    Transport::system(globals.github_token.clone()).map_err(suggestions::for_cli)
}
