//! # Update Local Doc Repos Command Implementation
//!
//! Runs `git pull` in every section working copy that sits next to the
//! book directory. Sections without a working copy are skipped, and a
//! failed pull is logged without stopping the others.

use anyhow::Result;

use bookbinder::repository::{RepositoryHandle, RepositoryRef};
use bookbinder::suggestions;

use super::{load_config, transport, GlobalArgs};

pub fn execute(globals: &GlobalArgs) -> Result<()> {
    let context = globals.context();
    let config = load_config(&context)?;
    let transport = transport(globals)?;

    for section in config.sections() {
        let reference = RepositoryRef::from_config(&section.repository)
            .map_err(suggestions::for_cli)?
            .with_local_repo_dir(&context.local_repo_dir);
        RepositoryHandle::new(reference, transport.clone()).pull_if_present();
    }

    Ok(())
}
