//! # Change Monitor
//!
//! Decides whether a rebuild is needed by comparing every repository's
//! current head commit with the one recorded after the previous check.
//!
//! The cache is a flat YAML mapping of `namespace/name` to commit id. Head
//! lookups run in parallel on the rayon thread pool; the cache is only
//! rewritten once all of them have succeeded, so a failed lookup never
//! leaves a half-updated cache behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::error::Result;
use crate::filesystem;
use crate::repository::{RepositoryHandle, RepositoryRef, Transport};

type ShaCache = BTreeMap<String, String>;

pub struct ChangeMonitor {
    transport: Transport,
}

impl ChangeMonitor {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// True when any repository moved since the last check, or when there
    /// was no previous check.
    ///
    /// On success the cache at `cache_path` holds the fresh heads. When a
    /// head lookup fails the error is returned and the cache is untouched.
    pub fn build_necessary(&self, repos: &[RepositoryRef], cache_path: &Path) -> Result<bool> {
        let heads = repos
            .par_iter()
            .map(|reference| {
                let handle = RepositoryHandle::new(reference.clone(), self.transport.clone());
                handle
                    .head_commit()
                    .map(|sha| (reference.full_name().to_string(), sha))
            })
            .collect::<Result<Vec<_>>>()?;

        let previous = load_cache(cache_path);
        let changed = match &previous {
            None => true,
            Some(cached) => heads
                .iter()
                .any(|(name, sha)| cached.get(name) != Some(sha)),
        };

        let fresh: ShaCache = heads.into_iter().collect();
        write_cache(cache_path, &fresh)?;

        log::debug!(
            "{} repositories checked, build {}necessary",
            fresh.len(),
            if changed { "" } else { "not " }
        );
        Ok(changed)
    }
}

/// `None` when there is no cache file at all. A cache that cannot be read
/// or parsed counts as empty.
fn load_cache(path: &Path) -> Option<ShaCache> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("Could not read SHA cache {}: {}", path.display(), e);
            return Some(ShaCache::new());
        }
    };

    if content.trim().is_empty() {
        return Some(ShaCache::new());
    }

    match serde_yaml::from_str::<Option<ShaCache>>(&content) {
        Ok(cache) => Some(cache.unwrap_or_default()),
        Err(e) => {
            log::warn!("Ignoring unreadable SHA cache {}: {}", path.display(), e);
            Some(ShaCache::new())
        }
    }
}

fn write_cache(path: &Path, cache: &ShaCache) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(cache)?;
    filesystem::write_atomic(path, yaml.as_bytes())
}
