//! # Validate Command Implementation
//!
//! Checks the book's `config.yml` without fetching any section:
//!
//! - the document parses and has a `book_repo`
//! - every section names its repository and directories are unique
//! - every DITA section has a `ditamap_location`
//! - a declared `schema_version` is supported
//!
//! With `--check-credentials` the credentials document in `cred_repo` is
//! also loaded and the routing tables of both environments are checked.
//! That step needs access to the credential repository.

use anyhow::Result;
use clap::Args;

use bookbinder::bind::check_schema_version;
use bookbinder::credentials::{Environment, RemoteYamlCredentialProvider};
use bookbinder::repository::{RepositoryHandle, RepositoryRef};
use bookbinder::suggestions;

use super::{load_config, transport, GlobalArgs};

/// Validate the book's config.yml
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also load credentials.yml from cred_repo and check it
    #[arg(long)]
    pub check_credentials: bool,
}

pub fn execute(args: ValidateArgs, globals: &GlobalArgs) -> Result<()> {
    let out = globals.output();
    let context = globals.context();
    let config = load_config(&context)?;

    config.validate().map_err(suggestions::for_cli)?;
    if let Some(declared) = &config.schema_version {
        check_schema_version(declared).map_err(suggestions::for_cli)?;
    }

    if args.check_credentials {
        let cred_repo = config.cred_repo().map_err(suggestions::for_cli)?;
        let provider = RemoteYamlCredentialProvider::new(RepositoryHandle::new(
            RepositoryRef::new(cred_repo),
            transport(globals)?,
        ));
        let credentials = provider.credentials().map_err(suggestions::for_cli)?;

        credentials.aws().map_err(suggestions::for_cli)?;
        for environment in [Environment::Staging, Environment::Production] {
            credentials
                .cloud_foundry(environment)
                .map_err(suggestions::for_cli)?;
        }
    }

    println!(
        "{} {} with {} sections and {} DITA sections",
        out.success("Valid:"),
        context.config_path().display(),
        config.sections().len(),
        config.dita_sections.len()
    );
    Ok(())
}
