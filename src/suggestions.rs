//! # Error Messages for the CLI
//!
//! The library's errors say what went wrong. The helpers here phrase them
//! for someone running `bookbinder`, and add a hint on how to fix the
//! problem where there is an obvious one.

use crate::assemble::AssemblyReport;
use crate::book::TagReport;
use crate::error::Error;

/// One-line message for a library error as the CLI reports it.
pub fn describe(error: &Error) -> String {
    match error {
        Error::SchemaVersionUnsupported { version } => {
            format!("config.yml at version '{}' has an unsupported API.", version)
        }
        Error::CredentialMalformed { message } => format!("{}, in credentials.yml", message),
        Error::ConfigurationMissing { .. } => format!("{} from your configuration.", error),
        other => other.to_string(),
    }
}

/// Turn a library error into the error `main` prints.
pub fn for_cli(error: Error) -> anyhow::Error {
    anyhow::anyhow!(describe(&error))
}

/// Error for a fetch where some sections could not be materialized.
///
/// When every failure was a transport problem the run is worth repeating
/// as is, and the hint says so.
pub fn assembly_incomplete(report: &AssemblyReport) -> anyhow::Error {
    let summary = format!(
        "{} of {} sections could not be fetched",
        report.failures.len(),
        report.sections.len()
    );

    if report.failures.iter().all(|(_, error)| error.is_transport()) {
        anyhow::anyhow!(
            "{summary}\n\n\
             hint: Check network and SSH access, then fetch again; \
             working copies from this run are reused"
        )
    } else {
        anyhow::anyhow!(summary)
    }
}

/// Error for a tagging run where some repositories were not tagged.
pub fn tagging_incomplete(tag: &str, report: &TagReport) -> anyhow::Error {
    let failed = report
        .failures()
        .map(|(name, error)| format!("  {}: {}", name, describe(error)))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::anyhow!(
        "Not every repository was tagged with {tag}:\n{failed}\n\n\
         hint: Fix the problems above and run `bookbinder tag {tag} --skip-existing` \
         to tag only the remaining repositories"
    )
}
