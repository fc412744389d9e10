//! Explicit run context and output layout
//!
//! Nothing in the library reads or changes the process working directory.
//! Commands build a `RunContext` once and hand it to every operation that
//! needs a base path.

use std::path::{Path, PathBuf};

/// Base locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Directory holding the book's own working copy and `config.yml`.
    pub book_dir: PathBuf,
    /// Directory whose children are sibling working copies of sections.
    pub local_repo_dir: PathBuf,
    /// Shared output layout derived from `book_dir`.
    pub output_locations: OutputLocations,
}

impl RunContext {
    /// Context for a book checked out at `book_dir`.
    ///
    /// Sections are looked up next to the book, in `book_dir`'s parent.
    pub fn for_book_dir(book_dir: impl Into<PathBuf>) -> Self {
        let book_dir = book_dir.into();
        let local_repo_dir = book_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| book_dir.clone());

        Self {
            output_locations: OutputLocations::new(&book_dir),
            local_repo_dir,
            book_dir,
        }
    }

    /// Override where sibling working copies are looked up.
    pub fn with_local_repo_dir(mut self, local_repo_dir: impl Into<PathBuf>) -> Self {
        self.local_repo_dir = local_repo_dir.into();
        self
    }

    /// Path of the book's configuration document.
    pub fn config_path(&self) -> PathBuf {
        self.book_dir.join(crate::defaults::CONFIG_FILE_NAME)
    }
}

/// Base directories for everything a bind run produces.
///
/// Every path is a pure function of the context directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocations {
    context_dir: PathBuf,
}

impl OutputLocations {
    pub fn new(context_dir: impl AsRef<Path>) -> Self {
        Self {
            context_dir: context_dir.as_ref().to_path_buf(),
        }
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    pub fn output_dir(&self) -> PathBuf {
        self.context_dir.join("output")
    }

    pub fn final_app_dir(&self) -> PathBuf {
        self.context_dir.join("final_app")
    }

    pub fn dita_home_dir(&self) -> PathBuf {
        self.output_dir().join("dita")
    }

    /// Where remote DITA sections are cloned.
    pub fn cloned_dita_dir(&self) -> PathBuf {
        self.dita_home_dir().join("dita_sections")
    }

    pub fn html_from_dita_dir(&self) -> PathBuf {
        self.dita_home_dir().join("html_from_dita")
    }

    pub fn formatted_dir(&self) -> PathBuf {
        self.dita_home_dir().join("formatted")
    }

    pub fn site_generator_home(&self) -> PathBuf {
        self.output_dir().join("master_middleman")
    }

    /// Staging area the site generator reads section sources from.
    pub fn source_for_site_generator(&self) -> PathBuf {
        self.site_generator_home().join("source")
    }
}
