//! # Check For Changes Command Implementation
//!
//! Compares the head commit of the book and of every section with the SHA
//! cache left by the previous run, and says whether a rebuild is needed.
//! The cache is refreshed on every successful check.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use bookbinder::change_monitor::ChangeMonitor;
use bookbinder::defaults::default_cache_file;
use bookbinder::repository::RepositoryRef;
use bookbinder::suggestions;

use super::{load_config, transport, GlobalArgs};

/// Check whether the book needs rebuilding
#[derive(Args, Debug)]
pub struct CheckForChangesArgs {
    /// SHA cache file.
    ///
    /// Defaults to `bookbinder/cached_shas.yml` under the system cache
    /// directory.
    #[arg(long, value_name = "FILE", env = "BOOKBINDER_CACHE")]
    pub cache_file: Option<PathBuf>,
}

pub fn execute(args: CheckForChangesArgs, globals: &GlobalArgs) -> Result<()> {
    let out = globals.output();
    let context = globals.context();
    let config = load_config(&context)?;

    let mut repos = vec![RepositoryRef::new(
        config.book_repo().map_err(suggestions::for_cli)?,
    )];
    for section in config.sections() {
        repos.push(RepositoryRef::from_config(&section.repository).map_err(suggestions::for_cli)?);
    }

    let cache_file = args.cache_file.unwrap_or_else(default_cache_file);
    let monitor = ChangeMonitor::new(transport(globals)?);
    let necessary = monitor
        .build_necessary(&repos, &cache_file)
        .map_err(suggestions::for_cli)?;

    if necessary {
        println!("{}", out.success("Build necessary: repositories changed since the last check"));
    } else {
        println!("No changes since the last check");
    }
    Ok(())
}
