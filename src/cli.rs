//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, GlobalArgs};

/// Bookbinder - Assemble documentation books from versioned repositories
#[derive(Parser, Debug)]
#[command(name = "bookbinder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the book's config.yml
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "BOOKBINDER_BOOK_DIR",
        default_value = "."
    )]
    book_dir: PathBuf,

    /// Token for the hosting API
    #[arg(long, global = true, env = "BOOKBINDER_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a tag to the book and every one of its sections
    Tag(commands::tag::TagArgs),

    /// Run `git pull` on every section checked out next to the book
    UpdateLocalDocRepos,

    /// Report whether any repository changed since the last check
    CheckForChanges(commands::check_for_changes::CheckForChangesArgs),

    /// Materialize every section of the book
    Fetch(commands::fetch::FetchArgs),

    /// Validate the book's config.yml
    Validate(commands::validate::ValidateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .format_target(false)
            .format_timestamp(None)
            .init();

        let globals = GlobalArgs {
            book_dir: self.book_dir,
            github_token: self.github_token,
            color: self.color,
        };

        match self.command {
            Commands::Tag(args) => commands::tag::execute(args, &globals),
            Commands::UpdateLocalDocRepos => commands::update_local_doc_repos::execute(&globals),
            Commands::CheckForChanges(args) => commands::check_for_changes::execute(args, &globals),
            Commands::Fetch(args) => commands::fetch::execute(args, &globals),
            Commands::Validate(args) => commands::validate::execute(args, &globals),
        }
    }
}
