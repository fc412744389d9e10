//! Mock transports shared by the unit tests.
//!
//! `MockGit` and `MockApi` record every call they receive so tests can
//! assert on what would have gone over the wire.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};
use crate::hosting::HostingApi;
use crate::repository::{GitOperations, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone {
        url: String,
        name: String,
        parent: PathBuf,
    },
    Checkout {
        repo_dir: PathBuf,
        reference: String,
    },
    Pull {
        repo_dir: PathBuf,
    },
}

/// Records git calls. Touches the disk only to write files registered
/// with `with_file_at`.
#[derive(Default)]
pub struct MockGit {
    calls: Mutex<Vec<GitCall>>,
    clone_failures: HashMap<String, String>,
    files: HashMap<String, Vec<(String, String)>>,
    fail_pull: bool,
}

impl MockGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloning `url` fails with `stderr`.
    pub fn failing_clone(mut self, url: &str, stderr: &str) -> Self {
        self.clone_failures
            .insert(url.to_string(), stderr.to_string());
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    /// Put `contents` at `path` in the working copy once `reference` is
    /// checked out (or on clone, for the default branch).
    pub fn with_file_at(mut self, reference: &str, path: &str, contents: &str) -> Self {
        self.files
            .entry(reference.to_string())
            .or_default()
            .push((path.to_string(), contents.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clones(&self) -> Vec<(String, String, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GitCall::Clone { url, name, parent } => Some((url, name, parent)),
                _ => None,
            })
            .collect()
    }

    pub fn checkouts(&self) -> Vec<(PathBuf, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GitCall::Checkout {
                    repo_dir,
                    reference,
                } => Some((repo_dir, reference)),
                _ => None,
            })
            .collect()
    }

    fn write_files(&self, repo_dir: &Path, reference: &str) -> Result<()> {
        if let Some(files) = self.files.get(reference) {
            for (path, contents) in files {
                let target = repo_dir.join(path);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(target, contents)?;
            }
        }
        Ok(())
    }
}

impl GitOperations for MockGit {
    fn clone_repo(&self, url: &str, name: &str, parent: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(GitCall::Clone {
            url: url.to_string(),
            name: name.to_string(),
            parent: parent.to_path_buf(),
        });

        if let Some(stderr) = self.clone_failures.get(url) {
            return Err(Error::GitCommand {
                command: format!("clone {} {}", url, name),
                url: url.to_string(),
                stderr: stderr.clone(),
            });
        }

        self.write_files(&parent.join(name), DEFAULT_BRANCH)
    }

    fn checkout(&self, repo_dir: &Path, reference: &str) -> Result<()> {
        self.calls.lock().unwrap().push(GitCall::Checkout {
            repo_dir: repo_dir.to_path_buf(),
            reference: reference.to_string(),
        });
        self.write_files(repo_dir, reference)
    }

    fn pull(&self, repo_dir: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(GitCall::Pull {
            repo_dir: repo_dir.to_path_buf(),
        });
        if self.fail_pull {
            return Err(Error::GitCommand {
                command: "pull".to_string(),
                url: repo_dir.display().to_string(),
                stderr: "fatal: not a git repository".to_string(),
            });
        }
        Ok(())
    }
}

/// Request made to `MockApi::head_sha`: name, ref, credential.
pub type HeadRequest = (String, Option<String>, Option<String>);

/// In-memory hosting service.
#[derive(Default)]
pub struct MockApi {
    heads: HashMap<String, String>,
    tags: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    head_requests: Mutex<Vec<HeadRequest>>,
    created_tags: Mutex<Vec<(String, String, String)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head(mut self, full_name: &str, sha: &str) -> Self {
        self.heads.insert(full_name.to_string(), sha.to_string());
        self
    }

    pub fn with_tags(mut self, full_name: &str, tags: &[&str]) -> Self {
        self.tags.insert(
            full_name.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Every request about `full_name` fails.
    pub fn failing_for(mut self, full_name: &str) -> Self {
        self.failing.insert(full_name.to_string());
        self
    }

    pub fn head_requests(&self) -> Vec<HeadRequest> {
        self.head_requests.lock().unwrap().clone()
    }

    pub fn created_tags(&self) -> Vec<(String, String, String)> {
        self.created_tags.lock().unwrap().clone()
    }

    fn check(&self, full_name: &str) -> Result<()> {
        if self.failing.contains(full_name) {
            return Err(Error::Network {
                url: format!("https://api.example.com/repos/{}", full_name),
                message: "503 Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl HostingApi for MockApi {
    fn head_sha(
        &self,
        full_name: &str,
        reference: Option<&str>,
        credential: Option<&str>,
    ) -> Result<String> {
        self.head_requests.lock().unwrap().push((
            full_name.to_string(),
            reference.map(str::to_string),
            credential.map(str::to_string),
        ));
        self.check(full_name)?;

        self.heads
            .get(full_name)
            .cloned()
            .ok_or_else(|| Error::RepositoryNotFound {
                repository: full_name.to_string(),
            })
    }

    fn create_tag(
        &self,
        full_name: &str,
        tag: &str,
        sha: &str,
        _credential: Option<&str>,
    ) -> Result<()> {
        self.check(full_name)?;
        self.created_tags.lock().unwrap().push((
            full_name.to_string(),
            tag.to_string(),
            sha.to_string(),
        ));
        Ok(())
    }

    fn tags(&self, full_name: &str, _credential: Option<&str>) -> Result<Vec<String>> {
        self.check(full_name)?;
        Ok(self.tags.get(full_name).cloned().unwrap_or_default())
    }
}

pub fn transport(git: &Arc<MockGit>, api: &Arc<MockApi>) -> Transport {
    Transport::new(git.clone(), api.clone())
}
