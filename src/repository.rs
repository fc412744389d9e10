//! # Repository Handles
//!
//! This module provides `RepositoryHandle`, the runtime object that knows how
//! to materialize, tag, and query one content repository. A handle wraps a
//! `RepositoryRef` (what to fetch) and a `Transport` (how to reach it).
//!
//! ## Design
//!
//! The handle is built around two capability traits so the transport can be
//! swapped out:
//!
//! - **`GitOperations`**: clone, checkout, and pull on working copies. The
//!   default implementation shells out to the system `git` command.
//!
//! - **`HostingApi`** (in [`crate::hosting`]): head lookup, tag creation, and
//!   tag listing against the hosting service's REST API.
//!
//! In the main application `DefaultGitOperations` and `GitHubApi` are used.
//! In tests both are replaced with mocks that record every call, which lets
//! us assert things like "no checkout happens for the default branch"
//! without touching the network.
//!
//! ## Idempotence
//!
//! A handle remembers where it materialized its repository. Asking it to
//! materialize into the same place again is a no-op. Across runs, a remote
//! working copy already at the destination is reused, and a local copy is
//! replaced so it matches the sibling working copy.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::RepositoryConfig;
use crate::defaults::{API_BASE_URL, API_TIMEOUT, DEFAULT_BRANCH, GIT_TIMEOUT};
use crate::error::{Error, Result};
use crate::filesystem;
use crate::git;
use crate::hosting::{GitHubApi, HostingApi};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clones `url` into the working directory `parent/name`.
    fn clone_repo(&self, url: &str, name: &str, parent: &Path) -> Result<()>;

    /// Checks out a branch, tag, or commit inside an existing working copy.
    fn checkout(&self, repo_dir: &Path, reference: &str) -> Result<()>;

    /// Updates an existing working copy from its upstream.
    fn pull(&self, repo_dir: &Path) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations {
    timeout: Duration,
}

impl DefaultGitOperations {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for DefaultGitOperations {
    fn default() -> Self {
        Self::new(GIT_TIMEOUT)
    }
}

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, name: &str, parent: &Path) -> Result<()> {
        git::clone(url, name, parent, self.timeout)
    }

    fn checkout(&self, repo_dir: &Path, reference: &str) -> Result<()> {
        git::checkout(repo_dir, reference, self.timeout)
    }

    fn pull(&self, repo_dir: &Path) -> Result<()> {
        git::pull(repo_dir, self.timeout)
    }
}

/// The pair of capabilities every handle in a run shares.
#[derive(Clone)]
pub struct Transport {
    git: Arc<dyn GitOperations>,
    api: Arc<dyn HostingApi>,
}

impl Transport {
    pub fn new(git: Arc<dyn GitOperations>, api: Arc<dyn HostingApi>) -> Self {
        Self { git, api }
    }

    /// System `git` plus the public GitHub API, authenticated with `token`
    /// when one is given.
    pub fn system(token: Option<String>) -> Result<Self> {
        let api = GitHubApi::new(API_BASE_URL, token, API_TIMEOUT)?;
        Ok(Self::new(
            Arc::new(DefaultGitOperations::default()),
            Arc::new(api),
        ))
    }

    pub fn git(&self) -> &dyn GitOperations {
        self.git.as_ref()
    }

    pub fn api(&self) -> &dyn HostingApi {
        self.api.as_ref()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

/// Identifies one content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    full_name: String,
    target_ref: Option<String>,
    local_repo_dir: Option<PathBuf>,
    directory: Option<String>,
    credential: Option<String>,
}

impl RepositoryRef {
    /// A reference to `namespace/name`. The name may be empty.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            target_ref: None,
            local_repo_dir: None,
            directory: None,
            credential: None,
        }
    }

    /// Build a reference from a `repository:` block of the configuration.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        let full_name = config
            .name
            .clone()
            .ok_or_else(|| Error::ConfigurationMissing {
                field: "full_name".to_string(),
                context: Some("repository".to_string()),
            })?;

        Ok(Self::new(full_name).with_target_ref(config.r#ref.clone()))
    }

    pub fn with_target_ref(mut self, target_ref: Option<String>) -> Self {
        self.target_ref = target_ref;
        self
    }

    pub fn with_local_repo_dir(mut self, local_repo_dir: impl Into<PathBuf>) -> Self {
        self.local_repo_dir = Some(local_repo_dir.into());
        self
    }

    pub fn with_directory(mut self, directory: Option<String>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The repository name without its namespace.
    pub fn short_name(&self) -> &str {
        match self.full_name.rfind('/') {
            Some(idx) => &self.full_name[idx + 1..],
            None => &self.full_name,
        }
    }

    /// Destination subpath within the assembled tree.
    pub fn directory(&self) -> &str {
        self.directory.as_deref().unwrap_or_else(|| self.short_name())
    }

    /// The ref to materialize, falling back to the default branch.
    pub fn target_ref(&self) -> &str {
        self.target_ref.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// The ref exactly as configured, if any.
    pub fn explicit_target_ref(&self) -> Option<&str> {
        self.target_ref.as_deref()
    }

    pub fn local_repo_dir(&self) -> Option<&Path> {
        self.local_repo_dir.as_deref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Where a sibling working copy of this repository would live.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.local_repo_dir
            .as_ref()
            .map(|dir| dir.join(self.short_name()))
    }
}

/// Turn a raw clone failure into the error kind a caller can act on.
///
/// Authentication and missing-repository failures become their own
/// variants; anything else is returned unchanged.
pub fn classify_clone_error(full_name: &str, error: Error) -> Error {
    let detail = match &error {
        Error::GitCommand { stderr, .. } => stderr.as_str(),
        _ => return error,
    };

    if detail.contains("Permission denied") {
        Error::RepositoryAccessDenied {
            repository: full_name.to_string(),
        }
    } else if detail.contains("Repository not found") || detail.contains("does not exist") {
        Error::RepositoryNotFound {
            repository: full_name.to_string(),
        }
    } else {
        error
    }
}

/// Runtime handle for one repository.
#[derive(Debug)]
pub struct RepositoryHandle {
    reference: RepositoryRef,
    transport: Transport,
    copied_to: Option<PathBuf>,
}

impl RepositoryHandle {
    pub fn new(reference: RepositoryRef, transport: Transport) -> Self {
        Self {
            reference,
            transport,
            copied_to: None,
        }
    }

    pub fn reference(&self) -> &RepositoryRef {
        &self.reference
    }

    pub fn full_name(&self) -> &str {
        self.reference.full_name()
    }

    /// Whether a materialization has succeeded.
    pub fn is_copied(&self) -> bool {
        self.copied_to.is_some()
    }

    /// Where the repository was materialized, once it has been.
    pub fn copied_to(&self) -> Option<&Path> {
        self.copied_to.as_deref()
    }

    /// Clone the repository into `destination/<short_name>` at `reference`.
    pub fn materialize_remote(&mut self, destination: &Path, reference: &str) -> Result<PathBuf> {
        let name = self.reference.short_name().to_string();
        self.materialize_remote_as(destination, &name, reference)
    }

    /// Clone the repository into `destination/<name>` at `reference`.
    ///
    /// The working copy is left on the default branch without an explicit
    /// checkout when `reference` names it. A working copy already at the
    /// target from an earlier run is reused instead of cloned again.
    pub fn materialize_remote_as(
        &mut self,
        destination: &Path,
        name: &str,
        reference: &str,
    ) -> Result<PathBuf> {
        let target = destination.join(name);
        if self.copied_to.as_deref() == Some(target.as_path()) {
            return Ok(target);
        }

        let full_name = self.reference.full_name();
        if target.join(".git").exists() {
            log::info!("Reusing {} at {}", full_name, target.display());
        } else {
            let url = git::clone_url(full_name);
            log::info!("Cloning {} into {}", full_name, target.display());

            self.transport
                .git()
                .clone_repo(&url, name, destination)
                .map_err(|e| classify_clone_error(full_name, e))?;
        }

        if reference != DEFAULT_BRANCH {
            self.transport.git().checkout(&target, reference)?;
        }

        self.copied_to = Some(target.clone());
        Ok(target)
    }

    /// Copy the sibling working copy into `destination/<short_name>`.
    ///
    /// Returns `Ok(None)` when there is no sibling working copy.
    pub fn materialize_local(&mut self, destination: &Path) -> Result<Option<PathBuf>> {
        let name = self.reference.short_name().to_string();
        self.materialize_local_as(destination, &name)
    }

    /// Copy the sibling working copy into `destination/<name>`.
    ///
    /// A copy left at the target by an earlier run is replaced.
    pub fn materialize_local_as(
        &mut self,
        destination: &Path,
        name: &str,
    ) -> Result<Option<PathBuf>> {
        let source = match self.reference.local_path() {
            Some(source) if source.is_dir() => source,
            Some(source) => {
                log::info!("  skipping (not found) {}", source.display());
                return Ok(None);
            }
            None => {
                log::info!(
                    "  skipping (no local repository directory) {}",
                    self.reference.full_name()
                );
                return Ok(None);
            }
        };

        let target = destination.join(name);
        if self.copied_to.as_deref() == Some(target.as_path()) {
            return Ok(Some(target));
        }
        if target.exists() {
            log::debug!("Replacing earlier copy at {}", target.display());
            fs::remove_dir_all(&target)?;
        }
        log::info!("  copying {}", source.display());
        filesystem::copy_dir_all(&source, &target)?;

        self.copied_to = Some(target.clone());
        Ok(Some(target))
    }

    /// Commit id this repository currently resolves to.
    ///
    /// A configured ref that is already a full commit id is returned as-is;
    /// anything else is looked up through the hosting API.
    pub fn head_commit(&self) -> Result<String> {
        let explicit = self.reference.explicit_target_ref();
        if let Some(sha) = explicit.filter(|r| git::is_commit_sha(r)) {
            return Ok(sha.to_string());
        }

        self.transport
            .api()
            .head_sha(self.full_name(), explicit, self.reference.credential())
    }

    /// Tag the current head commit with `tag`.
    ///
    /// Creating a tag that already exists fails; use [`Self::has_tag`] first
    /// when re-running.
    pub fn tag(&self, tag: &str) -> Result<()> {
        let sha = self.head_commit()?;
        self.transport
            .api()
            .create_tag(self.full_name(), tag, &sha, self.reference.credential())
    }

    pub fn has_tag(&self, tag: &str) -> Result<bool> {
        let tags = self
            .transport
            .api()
            .tags(self.full_name(), self.reference.credential())?;
        Ok(tags.iter().any(|existing| existing == tag))
    }

    /// Pull the sibling working copy if there is one. Never fails.
    pub fn pull_if_present(&self) {
        match self.reference.local_path() {
            Some(path) if path.is_dir() => {
                log::info!("Updating {}", path.display());
                if let Err(e) = self.transport.git().pull(&path) {
                    log::warn!("Could not update {}: {}", path.display(), e);
                }
            }
            Some(path) => log::info!("  skipping (not found) {}", path.display()),
            None => log::debug!(
                "{} has no local repository directory",
                self.reference.full_name()
            ),
        }
    }

    /// Read one file from the repository as it is at `reference`.
    ///
    /// The repository is cloned into a scratch directory that is removed
    /// again before returning.
    pub fn read_file_at(&self, path: &str, reference: &str) -> Result<String> {
        let scratch = tempfile::TempDir::new()?;
        let full_name = self.reference.full_name();
        let name = self.reference.short_name();

        self.transport
            .git()
            .clone_repo(&git::clone_url(full_name), name, scratch.path())
            .map_err(|e| classify_clone_error(full_name, e))?;

        let repo_dir = scratch.path().join(name);
        if reference != DEFAULT_BRANCH {
            self.transport.git().checkout(&repo_dir, reference)?;
        }

        Ok(fs::read_to_string(repo_dir.join(path))?)
    }
}
