//! # Tag Command Implementation
//!
//! Applies one tag to the book repository and to every section repository
//! named in `config.yml`. Sections are tagged first and the book last.
//!
//! Every repository is attempted even when an earlier one fails; the
//! command then exits non-zero and lists what was not tagged. Re-running
//! with `--skip-existing` finishes the job without tripping over the
//! repositories that already carry the tag.

use anyhow::Result;
use clap::Args;

use bookbinder::book::Book;
use bookbinder::suggestions;

use super::{load_config, transport, GlobalArgs};

/// Tag the book and all of its sections
#[derive(Args, Debug)]
pub struct TagArgs {
    /// The tag to apply
    pub tag: String,

    /// Leave repositories that already carry the tag alone
    #[arg(long)]
    pub skip_existing: bool,
}

pub fn execute(args: TagArgs, globals: &GlobalArgs) -> Result<()> {
    let out = globals.output();
    let context = globals.context();
    let config = load_config(&context)?;
    let book = Book::from_config(&config, transport(globals)?).map_err(suggestions::for_cli)?;

    let report = if args.skip_existing {
        book.tag_self_and_sections_skipping_existing(&args.tag)
    } else {
        book.tag_self_and_sections(&args.tag)
    };

    if !report.is_success() {
        return Err(suggestions::tagging_incomplete(&args.tag, &report));
    }

    println!("{}", out.success("Success!"));
    println!(
        " {} and its sections were tagged with {}",
        out.repository(book.full_name()),
        out.reference(&args.tag)
    );
    Ok(())
}
