//! DITA section gathering
//!
//! A DITA section is fetched like any other section but carries the
//! locations of its ditamap and ditaval so the external DITA-to-HTML step
//! knows what to convert. Remote sections are cloned under the run's
//! `output/dita/dita_sections` directory; local ones are used in place.

use std::path::PathBuf;

use crate::config::DitaSectionConfig;
use crate::context::OutputLocations;
use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};
use crate::repository::{RepositoryHandle, RepositoryRef, Transport};

/// A gathered DITA section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitaSection {
    pub path_to_local_repo: PathBuf,
    pub ditamap_location: Option<String>,
    pub ditaval_location: Option<String>,
    pub full_name: String,
    pub target_ref: Option<String>,
    pub directory: String,
    pub output_locations: OutputLocations,
}

/// Subnav namespace and the template that renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnav {
    pub namespace: String,
    pub template: String,
}

pub fn subnav(section: &DitaSection) -> Subnav {
    Subnav {
        namespace: section.directory.replace('/', "_"),
        template: format!("{}_subnav", section.directory),
    }
}

pub fn html_from_dita_section_dir(section: &DitaSection) -> PathBuf {
    section
        .output_locations
        .html_from_dita_dir()
        .join(&section.directory)
}

pub fn formatted_section_dir(section: &DitaSection) -> PathBuf {
    section
        .output_locations
        .formatted_dir()
        .join(&section.directory)
}

pub fn section_source_for_site_generator(section: &DitaSection) -> PathBuf {
    section
        .output_locations
        .source_for_site_generator()
        .join(&section.directory)
}

/// Produces `DitaSection`s from their configuration entries.
pub trait DitaSectionGatherer {
    /// Gather every entry in order, stopping at the first failure.
    fn gather(&self, configs: &[DitaSectionConfig]) -> Result<Vec<DitaSection>>;
}

fn section_name(config: &DitaSectionConfig) -> Result<&str> {
    config
        .repository
        .name
        .as_deref()
        .ok_or_else(|| Error::ConfigurationMissing {
            field: "repository.name".to_string(),
            context: Some("dita_sections".to_string()),
        })
}

/// Clones every DITA section from the hosting service.
pub struct RemoteDitaSectionGatherer {
    transport: Transport,
    output_locations: OutputLocations,
}

impl RemoteDitaSectionGatherer {
    pub fn new(transport: Transport, output_locations: OutputLocations) -> Self {
        Self {
            transport,
            output_locations,
        }
    }
}

impl DitaSectionGatherer for RemoteDitaSectionGatherer {
    fn gather(&self, configs: &[DitaSectionConfig]) -> Result<Vec<DitaSection>> {
        let clone_root = self.output_locations.cloned_dita_dir();

        configs
            .iter()
            .map(|config| {
                let name = section_name(config)?;
                log::info!("Gathering {}", name);

                let target_ref = config.repository.r#ref.clone();
                let mut handle = RepositoryHandle::new(
                    RepositoryRef::new(name)
                        .with_target_ref(target_ref.clone())
                        .with_directory(Some(config.directory.clone())),
                    self.transport.clone(),
                );
                let path = handle.materialize_remote_as(
                    &clone_root,
                    &config.directory,
                    target_ref.as_deref().unwrap_or(DEFAULT_BRANCH),
                )?;

                Ok(DitaSection {
                    path_to_local_repo: path,
                    ditamap_location: config.ditamap_location.clone(),
                    ditaval_location: config.ditaval_location.clone(),
                    full_name: name.to_string(),
                    target_ref,
                    directory: config.directory.clone(),
                    output_locations: self.output_locations.clone(),
                })
            })
            .collect()
    }
}

/// Points DITA sections at sibling working copies without cloning.
pub struct LocalDitaSectionGatherer {
    local_repo_dir: PathBuf,
    output_locations: OutputLocations,
}

impl LocalDitaSectionGatherer {
    pub fn new(local_repo_dir: impl Into<PathBuf>, output_locations: OutputLocations) -> Self {
        Self {
            local_repo_dir: local_repo_dir.into(),
            output_locations,
        }
    }
}

impl DitaSectionGatherer for LocalDitaSectionGatherer {
    fn gather(&self, configs: &[DitaSectionConfig]) -> Result<Vec<DitaSection>> {
        configs
            .iter()
            .map(|config| {
                let name = section_name(config)?;
                log::info!("Gathering {}", name);

                let reference = RepositoryRef::new(name).with_local_repo_dir(&self.local_repo_dir);
                let path = reference
                    .local_path()
                    .unwrap_or_else(|| self.local_repo_dir.join(name));

                Ok(DitaSection {
                    path_to_local_repo: path,
                    ditamap_location: config.ditamap_location.clone(),
                    ditaval_location: config.ditaval_location.clone(),
                    full_name: name.to_string(),
                    target_ref: config.repository.r#ref.clone(),
                    directory: config.directory.clone(),
                    output_locations: self.output_locations.clone(),
                })
            })
            .collect()
    }
}
