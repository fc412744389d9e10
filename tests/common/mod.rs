//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a workspace fixture laid out the way bookbinder
//! expects: a book directory holding `config.yml`, with section working
//! copies as its siblings.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::LOCAL_BOOK);
//!     fixture.command().arg("validate").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::TestFixture;
}

/// Common `config.yml` snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Book with two sections and no DITA content.
    pub const LOCAL_BOOK: &str = r#"
book_repo: some-org/some-book
schema_version: 1.0.0
public_host: docs.example.com
sections:
  - repository:
      name: some-org/dogs-repo
    directory: dogs
  - repository:
      name: some-org/cats-repo
"#;

    /// Book with a DITA section.
    pub const WITH_DITA: &str = r#"
book_repo: some-org/some-book
sections: []
dita_sections:
  - repository:
      name: some-org/dita-repo
    directory: dita
    ditamap_location: main.ditamap
"#;

    /// DITA section without the ditamap it needs.
    pub const DITA_WITHOUT_MAP: &str = r#"
book_repo: some-org/some-book
dita_sections:
  - repository:
      name: some-org/dita-repo
    directory: dita
"#;

    /// Declares a schema version nobody supports.
    pub const UNSUPPORTED_SCHEMA: &str = r#"
book_repo: some-org/some-book
schema_version: 9.0.0
sections: []
"#;

    pub const NO_BOOK_REPO: &str = "sections: []\n";

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "book_repo: [unclosed";

    pub const EMPTY: &str = "# nothing here\n";
}

/// Check if network tests should be skipped.
///
/// Returns `true` if the `SKIP_NETWORK_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A temporary workspace with a `book/` directory and room for siblings.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty book directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("book")
            .create_dir_all()
            .expect("Failed to create book directory");
        Self { temp_dir }
    }

    /// Write the book's `config.yml`.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("book/config.yml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file to the sibling working copy `repo`.
    #[allow(dead_code)]
    pub fn with_sibling_file(self, repo: &str, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(repo)
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn book_dir(&self) -> PathBuf {
        self.temp_dir.path().join("book")
    }

    /// Create a `bookbinder` command pointed at this fixture's book.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("bookbinder");
        cmd.current_dir(self.path())
            .env_remove("BOOKBINDER_BOOK_DIR")
            .env_remove("BOOKBINDER_GITHUB_TOKEN")
            .env_remove("BOOKBINDER_CACHE")
            .arg("--book-dir")
            .arg(self.book_dir())
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_book_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.book_dir().is_dir());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [
            configs::LOCAL_BOOK,
            configs::WITH_DITA,
            configs::DITA_WITHOUT_MAP,
            configs::UNSUPPORTED_SCHEMA,
            configs::NO_BOOK_REPO,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(config).expect("Config should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
