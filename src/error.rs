//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `bookbinder` library. It uses the `thiserror` library to create an `Error`
//! enum covering every failure mode of the synchronization engine.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant corresponds to one error kind
//!   and carries the context needed to report it (repository name, offending
//!   schema version, credential message, and so on).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Callers match on the variant rather than on message text. Transport
//! variants (`RepositoryAccessDenied`, `RepositoryNotFound`, `GitCommand`,
//! `Timeout`, `Network`) only concern the repository named in them, so a
//! caller driving many repositories can record the failure and carry on with
//! the rest.

use std::time::Duration;

use thiserror::Error;

/// Main error type for bookbinder operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required identity or configuration field is absent.
    #[error("Missing required configuration key '{field}'{}", context.as_ref().map(|c| format!(" in {}", c)).unwrap_or_default())]
    ConfigurationMissing {
        field: String,
        /// Where the field was expected, if known
        context: Option<String>,
    },

    /// An error occurred while parsing a configuration document.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The declared `schema_version` is not one this resolver supports.
    #[error("Unsupported schema version: {version}")]
    SchemaVersionUnsupported { version: String },

    /// The credentials document has an invalid shape.
    #[error("{message}")]
    CredentialMalformed { message: String },

    /// Authentication against the repository host failed.
    #[error("Unable to access repository {repository}. You do not have the correct access rights. Please either add the key to your SSH agent, or set the GIT_SSH environment variable to override default SSH key usage. For more information run: `man git`.")]
    RepositoryAccessDenied { repository: String },

    /// The repository does not exist or is not visible to us.
    #[error("Could not read from repository. Please make sure you have the correct access rights and the repository {repository} exists.")]
    RepositoryNotFound { repository: String },

    /// Any other failure of a git subprocess.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// A remote operation did not finish within its time budget.
    #[error("Timed out after {}s: {operation}", limit.as_secs())]
    Timeout { operation: String, limit: Duration },

    /// An error occurred while talking to the hosting API.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// True for failures that belong to a single repository's transport.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::RepositoryAccessDenied { .. }
                | Error::RepositoryNotFound { .. }
                | Error::GitCommand { .. }
                | Error::Timeout { .. }
                | Error::Network { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
