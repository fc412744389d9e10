//! # Books and Sections
//!
//! A `Book` is a root repository plus an ordered list of `Section`s, each of
//! which is itself a repository. The book owns no working copies; it builds
//! short-lived `RepositoryHandle`s whenever it needs to touch a repository.
//!
//! Whole-book tagging is the one operation here that spans several
//! repositories. Each repository is tagged independently and the outcome of
//! every attempt is collected in a `TagReport`, so a failure half-way
//! through does not hide which repositories were already tagged.

use std::path::{Path, PathBuf};

use crate::config::{Configuration, SectionConfig};
use crate::error::{Error, Result};
use crate::repository::{RepositoryHandle, RepositoryRef, Transport};

/// One content repository of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    reference: RepositoryRef,
    subnav_template: Option<String>,
    preprocess: bool,
    path: Option<PathBuf>,
}

impl Section {
    pub fn new(reference: RepositoryRef) -> Self {
        Self {
            reference,
            subnav_template: None,
            preprocess: true,
            path: None,
        }
    }

    pub fn from_config(config: &SectionConfig) -> Result<Self> {
        let reference = RepositoryRef::from_config(&config.repository)?
            .with_directory(config.directory.clone());

        Ok(Self {
            reference,
            subnav_template: config.subnav_template.clone(),
            preprocess: config.preprocess,
            path: None,
        })
    }

    pub fn with_subnav_template(mut self, template: impl Into<String>) -> Self {
        self.subnav_template = Some(template.into());
        self
    }

    pub fn with_preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Look for this section's working copy under `local_repo_dir`.
    pub fn with_local_repo_dir(mut self, local_repo_dir: impl Into<PathBuf>) -> Self {
        self.reference = self.reference.with_local_repo_dir(local_repo_dir);
        self
    }

    /// Pin the section to `version` and move it under `<version>/`.
    pub fn pinned_to(mut self, version: &str) -> Self {
        let directory = format!("{}/{}", version, self.reference.directory());
        self.reference = self
            .reference
            .with_target_ref(Some(version.to_string()))
            .with_directory(Some(directory));
        self
    }

    pub fn reference(&self) -> &RepositoryRef {
        &self.reference
    }

    pub fn full_name(&self) -> &str {
        self.reference.full_name()
    }

    pub fn directory(&self) -> &str {
        self.reference.directory()
    }

    pub fn subnav_template(&self) -> Option<&str> {
        self.subnav_template.as_deref()
    }

    pub fn preprocess(&self) -> bool {
        self.preprocess
    }

    /// Where the section was materialized; `None` if it was skipped.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_copied(&self) -> bool {
        self.path.is_some()
    }

    pub(crate) fn record_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }
}

/// What happened to one repository during tagging.
#[derive(Debug)]
pub enum TagStatus {
    Tagged,
    /// Skipped because the tag was already there.
    AlreadyTagged,
    Failed(Error),
}

#[derive(Debug)]
pub struct TagOutcome {
    pub full_name: String,
    pub status: TagStatus,
}

/// Per-repository outcomes of a whole-book tagging run, sections first.
#[derive(Debug, Default)]
pub struct TagReport {
    pub outcomes: Vec<TagOutcome>,
}

impl TagReport {
    /// True only when every repository ended up carrying the tag.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            TagStatus::Failed(e) => Some((outcome.full_name.as_str(), e)),
            _ => None,
        })
    }

    pub fn tagged(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, TagStatus::Tagged))
            .map(|outcome| outcome.full_name.as_str())
    }
}

/// A root repository and its ordered sections.
#[derive(Debug, Clone)]
pub struct Book {
    reference: RepositoryRef,
    sections: Vec<Section>,
    transport: Transport,
}

impl Book {
    pub fn new(reference: RepositoryRef, sections: Vec<Section>, transport: Transport) -> Self {
        Self {
            reference,
            sections,
            transport,
        }
    }

    /// The book named by `book_repo` with the configuration's sections.
    pub fn from_config(config: &Configuration, transport: Transport) -> Result<Self> {
        let reference = RepositoryRef::new(config.book_repo()?);
        let sections = config
            .sections()
            .iter()
            .map(Section::from_config)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(reference, sections, transport))
    }

    /// A book pinned to `reference`, cloned into `destination` when given.
    pub fn from_remote(
        full_name: &str,
        reference: &str,
        destination: Option<&Path>,
        transport: Transport,
    ) -> Result<Self> {
        let book = Self::new(
            RepositoryRef::new(full_name).with_target_ref(Some(reference.to_string())),
            Vec::new(),
            transport,
        );

        if let Some(destination) = destination {
            book.copy_from_remote(destination)?;
        }
        Ok(book)
    }

    pub fn reference(&self) -> &RepositoryRef {
        &self.reference
    }

    pub fn full_name(&self) -> &str {
        self.reference.full_name()
    }

    pub fn directory(&self) -> &str {
        self.reference.directory()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn head_commit(&self) -> Result<String> {
        self.handle(&self.reference).head_commit()
    }

    /// Clone the book repository itself into `destination`.
    pub fn copy_from_remote(&self, destination: &Path) -> Result<PathBuf> {
        self.handle(&self.reference)
            .materialize_remote(destination, self.reference.target_ref())
    }

    /// Copy the book's sibling working copy into `destination`.
    pub fn copy_from_local(&self, destination: &Path) -> Result<Option<PathBuf>> {
        self.handle(&self.reference).materialize_local(destination)
    }

    /// Tag every section and then the book itself with `tag`.
    ///
    /// Every repository is attempted exactly once, whatever happened to the
    /// others.
    pub fn tag_self_and_sections(&self, tag: &str) -> TagReport {
        self.tag_all(tag, false)
    }

    /// Like [`Self::tag_self_and_sections`], but repositories that already
    /// carry `tag` are left alone. Used to finish a partially tagged book.
    pub fn tag_self_and_sections_skipping_existing(&self, tag: &str) -> TagReport {
        self.tag_all(tag, true)
    }

    fn tag_all(&self, tag: &str, skip_existing: bool) -> TagReport {
        let references = self
            .sections
            .iter()
            .map(Section::reference)
            .chain(std::iter::once(&self.reference));

        let outcomes = references
            .map(|reference| {
                let handle = self.handle(reference);
                let status = match tag_one(&handle, tag, skip_existing) {
                    Ok(status) => status,
                    Err(e) => {
                        log::warn!("Failed to tag {} with {}: {}", reference.full_name(), tag, e);
                        TagStatus::Failed(e)
                    }
                };
                TagOutcome {
                    full_name: reference.full_name().to_string(),
                    status,
                }
            })
            .collect();

        TagReport { outcomes }
    }

    fn handle(&self, reference: &RepositoryRef) -> RepositoryHandle {
        RepositoryHandle::new(reference.clone(), self.transport.clone())
    }
}

fn tag_one(handle: &RepositoryHandle, tag: &str, skip_existing: bool) -> Result<TagStatus> {
    if skip_existing && handle.has_tag(tag)? {
        log::info!("{} is already tagged with {}", handle.full_name(), tag);
        return Ok(TagStatus::AlreadyTagged);
    }

    handle.tag(tag)?;
    log::info!("Tagged {} with {}", handle.full_name(), tag);
    Ok(TagStatus::Tagged)
}
