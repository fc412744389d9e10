//! # Fetch Command Implementation
//!
//! Resolves the bind configuration for the book and materializes every
//! section (and every DITA section) into the output tree, ready for the
//! site generator.
//!
//! With `--source local` sections are copied from working copies next to
//! the book; with `--source github` they are cloned, and a book that
//! declares `versions` also gets each published version's sections.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use bookbinder::assemble::assemble_sections;
use bookbinder::bind::{BindConfigResolver, SourceKind};
use bookbinder::dita::{DitaSectionGatherer, LocalDitaSectionGatherer, RemoteDitaSectionGatherer};
use bookbinder::suggestions;

use super::{load_config, transport, GlobalArgs};

/// Materialize every section of the book
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Where sections come from (local, github)
    #[arg(long, value_name = "SOURCE", default_value = "local")]
    pub source: SourceKind,

    /// Directory that receives the sections.
    ///
    /// Defaults to `output/master_middleman/source` under the book directory.
    #[arg(long, value_name = "DIR")]
    pub destination: Option<PathBuf>,
}

pub fn execute(args: FetchArgs, globals: &GlobalArgs) -> Result<()> {
    let out = globals.output();
    let context = globals.context();
    let config = load_config(&context)?;
    let transport = transport(globals)?;

    let bind = BindConfigResolver::new(transport.clone(), context.clone())
        .resolve(args.source, &config)
        .map_err(suggestions::for_cli)?;

    let destination = args
        .destination
        .unwrap_or_else(|| context.output_locations.source_for_site_generator());
    let report = assemble_sections(&bind, &destination, &transport);

    let gatherer: Box<dyn DitaSectionGatherer> = match args.source {
        SourceKind::Remote => Box::new(RemoteDitaSectionGatherer::new(
            transport.clone(),
            context.output_locations.clone(),
        )),
        SourceKind::Local => Box::new(LocalDitaSectionGatherer::new(
            context.local_repo_dir.clone(),
            context.output_locations.clone(),
        )),
    };
    let dita_sections = gatherer
        .gather(&bind.dita_sections)
        .map_err(suggestions::for_cli)?;

    for (name, error) in &report.failures {
        eprintln!("{} {}: {}", out.failure("failed"), name, suggestions::describe(error));
    }
    if !report.is_success() {
        return Err(suggestions::assembly_incomplete(&report));
    }

    println!(
        "{} {} of {} sections into {}, {} DITA sections",
        out.success("Fetched"),
        report.copied().count(),
        report.sections.len(),
        destination.display(),
        dita_sections.len()
    );
    Ok(())
}
