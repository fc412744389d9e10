//! Materializing every section of a resolved bind configuration
//!
//! Sections are processed in order. A section that fails to materialize is
//! recorded in the report and the remaining sections still run; a local
//! section with no sibling working copy is skipped with a log line.

use std::path::Path;

use crate::bind::{BindConfiguration, SourceKind};
use crate::book::Section;
use crate::error::{Error, Result};
use crate::repository::{RepositoryHandle, Transport};

#[derive(Debug, Default)]
pub struct AssemblyReport {
    /// Every section, with the path it was materialized to when it was.
    pub sections: Vec<Section>,
    /// `full_name` and error of every section that failed.
    pub failures: Vec<(String, Error)>,
}

impl AssemblyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn copied(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|section| section.is_copied())
    }
}

/// Materialize every section of `bind` under `destination/<directory>`.
pub fn assemble_sections(
    bind: &BindConfiguration,
    destination: &Path,
    transport: &Transport,
) -> AssemblyReport {
    let mut report = AssemblyReport::default();

    for section in &bind.sections {
        let mut section = section.clone();
        match materialize(&section, bind.source, destination, transport) {
            Ok(path) => section.record_path(path),
            Err(e) => {
                log::warn!("Could not materialize {}: {}", section.full_name(), e);
                report.failures.push((section.full_name().to_string(), e));
            }
        }
        report.sections.push(section);
    }

    report
}

fn materialize(
    section: &Section,
    source: SourceKind,
    destination: &Path,
    transport: &Transport,
) -> Result<Option<std::path::PathBuf>> {
    let reference = section.reference();
    let mut handle = RepositoryHandle::new(reference.clone(), transport.clone());

    match source {
        SourceKind::Remote => handle
            .materialize_remote_as(destination, reference.directory(), reference.target_ref())
            .map(Some),
        SourceKind::Local => handle.materialize_local_as(destination, reference.directory()),
    }
}
