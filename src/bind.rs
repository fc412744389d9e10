//! # Bind Configuration Resolver
//!
//! Turns a book's `config.yml` into the concrete list of sections a bind run
//! materializes.
//!
//! There are two outcomes:
//!
//! - **Locally tracked**: every section as configured, at its declared ref
//!   (or the default branch). For a local bind the sections are looked up as
//!   sibling working copies of the book.
//! - **Version pinned**: only for remote binds of a book that declares
//!   `versions`. On top of the current sections, the book's own
//!   `config.yml` is read at every version tag and each of its sections is
//!   pinned to that tag under a `<version>/` directory.
//!
//! A declared `schema_version` outside the supported set is rejected before
//! anything else happens.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use semver::Version;

use crate::book::Section;
use crate::config::{self, Configuration, DitaSectionConfig};
use crate::context::RunContext;
use crate::defaults::CONFIG_FILE_NAME;
use crate::error::{Error, Result};
use crate::repository::{RepositoryHandle, RepositoryRef, Transport};

/// Schema versions of `config.yml` this resolver understands.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0.0"];

/// Where section content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Sibling working copies next to the book.
    Local,
    /// Fresh clones from the hosting service.
    Remote,
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" => Ok(SourceKind::Local),
            "github" | "remote" => Ok(SourceKind::Remote),
            other => Err(Error::ConfigParse {
                message: format!("Unknown bind source '{}'", other),
                hint: Some("Use 'local' or 'github'".to_string()),
            }),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Local => write!(f, "local"),
            SourceKind::Remote => write!(f, "github"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindMode {
    LocallyTracked,
    VersionPinned { versions: Vec<String> },
}

/// Everything a bind run needs, resolved.
#[derive(Debug, Clone)]
pub struct BindConfiguration {
    pub source: SourceKind,
    pub mode: BindMode,
    pub book_repo: String,
    /// Current sections first, then pinned sections in version order.
    pub sections: Vec<Section>,
    pub dita_sections: Vec<DitaSectionConfig>,
    pub template_variables: BTreeMap<String, serde_yaml::Value>,
    pub host_for_sitemap: Option<String>,
    pub archive_menu: Option<serde_yaml::Value>,
}

impl BindConfiguration {
    pub fn is_version_pinned(&self) -> bool {
        matches!(self.mode, BindMode::VersionPinned { .. })
    }
}

/// Reject a declared schema version this resolver cannot read.
pub fn check_schema_version(declared: &str) -> Result<()> {
    let unsupported = || Error::SchemaVersionUnsupported {
        version: declared.to_string(),
    };

    let declared_version = Version::parse(declared.trim()).map_err(|_| unsupported())?;
    let supported = SUPPORTED_SCHEMA_VERSIONS
        .iter()
        .filter_map(|v| Version::parse(v).ok())
        .any(|v| v == declared_version);

    if supported {
        Ok(())
    } else {
        Err(unsupported())
    }
}

pub struct BindConfigResolver {
    transport: Transport,
    context: RunContext,
}

impl BindConfigResolver {
    pub fn new(transport: Transport, context: RunContext) -> Self {
        Self { transport, context }
    }

    pub fn resolve(&self, source: SourceKind, config: &Configuration) -> Result<BindConfiguration> {
        if let Some(declared) = &config.schema_version {
            check_schema_version(declared)?;
        }

        let book_repo = config.book_repo()?.to_string();
        let mut sections = config
            .sections()
            .iter()
            .map(Section::from_config)
            .collect::<Result<Vec<_>>>()?;

        let mode = if source == SourceKind::Remote && config.has_versions() {
            if config.schema_version.is_none() {
                return Err(Error::ConfigurationMissing {
                    field: "schema_version".to_string(),
                    context: Some("a book with versions".to_string()),
                });
            }
            sections.extend(self.pinned_sections(&book_repo, &config.versions)?);
            BindMode::VersionPinned {
                versions: config.versions.clone(),
            }
        } else {
            if source == SourceKind::Local {
                let local_repo_dir: PathBuf = self.context.local_repo_dir.clone();
                sections = sections
                    .into_iter()
                    .map(|section| section.with_local_repo_dir(local_repo_dir.clone()))
                    .collect();
            }
            BindMode::LocallyTracked
        };

        Ok(BindConfiguration {
            source,
            mode,
            book_repo,
            sections,
            dita_sections: config.dita_sections.clone(),
            template_variables: config.template_variables.clone(),
            host_for_sitemap: config.public_host.clone(),
            archive_menu: config.archive_menu.clone(),
        })
    }

    fn pinned_sections(&self, book_repo: &str, versions: &[String]) -> Result<Vec<Section>> {
        let book = RepositoryHandle::new(RepositoryRef::new(book_repo), self.transport.clone());
        let mut pinned = Vec::new();

        for version in versions {
            log::info!("Reading {} at {}", book_repo, version);
            let manifest = config::parse(&book.read_file_at(CONFIG_FILE_NAME, version)?)?;
            let sections = manifest
                .sections
                .ok_or_else(|| Error::SchemaVersionUnsupported {
                    version: version.clone(),
                })?;

            for section in &sections {
                pinned.push(Section::from_config(section)?.pinned_to(version));
            }
        }

        Ok(pinned)
    }
}
