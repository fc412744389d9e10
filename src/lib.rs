//! # Bookbinder Library
//!
//! This library assembles a documentation "book" out of independently
//! versioned content repositories. It is designed to be used by the
//! `bookbinder` command-line tool, but the pieces are usable on their own.
//!
//! ## Quick Example
//!
//! ```
//! use bookbinder::config;
//! use bookbinder::bind::check_schema_version;
//!
//! let yaml = r#"
//! book_repo: some-org/some-book
//! schema_version: 1.0.0
//! sections:
//!   - repository:
//!       name: some-org/dogs-repo
//!     directory: dogs
//! "#;
//! let config = config::parse(yaml).unwrap();
//! assert_eq!(config.book_repo().unwrap(), "some-org/some-book");
//! assert_eq!(config.sections()[0].directory.as_deref(), Some("dogs"));
//! assert!(check_schema_version("1.0.0").is_ok());
//! ```
//!
//! ## Core Concepts
//!
//! - **Repository handles (`repository`, `git`, `hosting`)**: Fetch a named
//!   repository at a specific ref, copy a sibling working copy, look up head
//!   commits, and create tags. Transport goes through the `GitOperations`
//!   and `HostingApi` traits.
//! - **Books (`book`, `assemble`)**: A root repository plus ordered
//!   sections; whole-book tagging and full-tree assembly.
//! - **Bind resolution (`bind`)**: Decides whether sections track live
//!   content or are pinned to published versions.
//! - **Change detection (`change_monitor`)**: Compares head commits with a
//!   cache to decide whether a rebuild is needed.
//! - **DITA sections (`dita`)**: Gathers DITA content and derives the paths
//!   the downstream converter works with.
//! - **Configuration (`config`, `credentials`, `context`)**: Document
//!   models and the explicit run context every operation receives.

pub mod assemble;
pub mod bind;
pub mod book;
pub mod change_monitor;
pub mod config;
pub mod context;
pub mod credentials;
pub mod defaults;
pub mod dita;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod hosting;
pub mod output;
pub mod repository;
pub mod suggestions;

#[cfg(test)]
mod test_support;
