//! Default values for bookbinder configuration.
//!
//! This module provides centralized default values used across the library
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Branch assumed to be checked out right after a fresh clone.
pub const DEFAULT_BRANCH: &str = "master";

/// Host used to build clone addresses (`git@<host>:<namespace>/<name>`).
pub const GIT_HOST: &str = "github.com";

/// Base URL of the hosting REST API.
pub const API_BASE_URL: &str = "https://api.github.com/";

/// File name of the configuration document inside a book repository.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// File name of the credentials document inside the credential repository.
pub const CREDENTIALS_FILE_NAME: &str = "credentials.yml";

/// Upper bound for a single git subprocess (clone, checkout, pull).
pub const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for a single hosting API request.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the default location of the change-detection cache file.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/bookbinder/cached_shas.yml` (XDG Base Directory)
/// - macOS: `~/Library/Caches/bookbinder/cached_shas.yml`
/// - Windows: `{FOLDERID_LocalAppData}\bookbinder\cached_shas.yml`
///
/// Falls back to `.bookbinder-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-file` CLI flag or the
/// `BOOKBINDER_CACHE` environment variable.
pub fn default_cache_file() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("bookbinder"))
        .unwrap_or_else(|| PathBuf::from(".bookbinder-cache"))
        .join("cached_shas.yml")
}
