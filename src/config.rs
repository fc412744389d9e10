//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent a book's
//! `config.yml`, as well as the logic for parsing and checking it.
//!
//! ## Key Components
//!
//! - **`Configuration`**: The whole document. Only `book_repo` is required
//!   for most commands; everything else has a sensible default.
//!
//! - **`SectionConfig`** / **`DitaSectionConfig`**: One entry of `sections`
//!   or `dita_sections`, each naming a `RepositoryConfig`.
//!
//! ## Parsing
//!
//! `parse` distinguishes three failure modes so the CLI can say something
//! useful: a document that is not YAML at all, a document that is empty, and
//! a document whose shape does not match the schema.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `repository:` block shared by sections and DITA sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// `namespace/name` of the repository.
    #[serde(default)]
    pub name: Option<String>,
    /// Branch, tag, or commit to use instead of the default branch.
    #[serde(default)]
    pub r#ref: Option<String>,
}

impl RepositoryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            r#ref: None,
        }
    }
}

fn default_preprocess() -> bool {
    true
}

/// One entry of `sections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub repository: RepositoryConfig,
    /// Destination directory; defaults to the repository's short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnav_template: Option<String>,
    /// Whether post-processing runs over this section.
    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
}

impl SectionConfig {
    pub fn new(repository: RepositoryConfig) -> Self {
        Self {
            repository,
            directory: None,
            subnav_template: None,
            preprocess: true,
        }
    }
}

/// One entry of `dita_sections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DitaSectionConfig {
    pub repository: RepositoryConfig,
    pub directory: String,
    #[serde(default)]
    pub ditamap_location: Option<String>,
    #[serde(default)]
    pub ditaval_location: Option<String>,
}

/// A parsed `config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub book_repo: Option<String>,
    /// `None` when the key is absent, which matters for version manifests.
    #[serde(default)]
    pub sections: Option<Vec<SectionConfig>>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub dita_sections: Vec<DitaSectionConfig>,
    #[serde(default)]
    pub cred_repo: Option<String>,
    #[serde(default)]
    pub template_variables: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub public_host: Option<String>,
    #[serde(default)]
    pub archive_menu: Option<serde_yaml::Value>,
}

impl Configuration {
    /// The book repository's `namespace/name`.
    pub fn book_repo(&self) -> Result<&str> {
        self.book_repo
            .as_deref()
            .ok_or_else(|| Error::ConfigurationMissing {
                field: "book_repo".to_string(),
                context: None,
            })
    }

    pub fn cred_repo(&self) -> Result<&str> {
        self.cred_repo
            .as_deref()
            .ok_or_else(|| Error::ConfigurationMissing {
                field: "cred_repo".to_string(),
                context: None,
            })
    }

    pub fn sections(&self) -> &[SectionConfig] {
        self.sections.as_deref().unwrap_or_default()
    }

    pub fn has_versions(&self) -> bool {
        !self.versions.is_empty()
    }

    /// Check the parts of the document the commands rely on.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.book_repo()?;

        let mut directories = HashSet::new();
        for (idx, section) in self.sections().iter().enumerate() {
            let name = section
                .repository
                .name
                .as_deref()
                .ok_or_else(|| Error::ConfigurationMissing {
                    field: "repository.name".to_string(),
                    context: Some(format!("sections[{}]", idx)),
                })?;

            let directory = section
                .directory
                .clone()
                .unwrap_or_else(|| short_name(name).to_string());
            if !directories.insert(directory.clone()) {
                return Err(Error::ConfigParse {
                    message: format!("Section directory '{}' is used more than once", directory),
                    hint: Some("Give one of the sections an explicit `directory`".to_string()),
                });
            }
        }

        for (idx, dita) in self.dita_sections.iter().enumerate() {
            let name = dita
                .repository
                .name
                .as_deref()
                .ok_or_else(|| Error::ConfigurationMissing {
                    field: "repository.name".to_string(),
                    context: Some(format!("dita_sections[{}]", idx)),
                })?;

            if dita.ditamap_location.is_none() {
                return Err(Error::ConfigParse {
                    message: format!("DITA section {} has no ditamap_location", name),
                    hint: Some(
                        "Every entry of dita_sections must declare a ditamap_location".to_string(),
                    ),
                });
            }
        }

        Ok(())
    }
}

fn short_name(full_name: &str) -> &str {
    full_name.rsplit('/').next().unwrap_or(full_name)
}

/// Parse a `config.yml` document.
pub fn parse(yaml_content: &str) -> Result<Configuration> {
    let raw: serde_yaml::Value = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: format!("There is a syntax error in your config file: {}", e),
        hint: None,
    })?;

    if raw.is_null() {
        return Err(Error::ConfigParse {
            message: "Your config.yml appears to be empty.".to_string(),
            hint: None,
        });
    }

    serde_yaml::from_value(raw).map_err(|e| Error::ConfigParse {
        message: format!("Invalid configuration: {}", e),
        hint: None,
    })
}

/// Parse the configuration file at `path`.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ConfigParse {
                message: format!(
                    "The configuration file specified does not exist. Please create a config YAML file at {}",
                    path.display()
                ),
                hint: Some("Run bookbinder from inside your book directory, or pass --book-dir".to_string()),
            }
        } else {
            Error::Io(e)
        }
    })?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
book_repo: some-org/some-repo
versions: [v1.7.1.9, redacted, v3]
cred_repo: some-org/cred-repo
schema_version: 1.0.0
public_host: http://www.example.com
template_variables:
  some-var: some-value
archive_menu: []
sections:
  - repository:
      name: foo/dogs-repo
      ref: some-sha
    directory: concepts
    subnav_template: dogs
  - repository:
      name: foo/cats-repo
    preprocess: false
dita_sections:
  - repository:
      name: fantastic/dita-repo
      ref: v2
    directory: dita-section
    ditamap_location: my-special-location
    ditaval_location: my-ditaval
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse(FULL_CONFIG).unwrap();

        assert_eq!(config.book_repo().unwrap(), "some-org/some-repo");
        assert_eq!(config.versions, vec!["v1.7.1.9", "redacted", "v3"]);
        assert_eq!(config.cred_repo().unwrap(), "some-org/cred-repo");
        assert_eq!(config.schema_version.as_deref(), Some("1.0.0"));
        assert_eq!(config.public_host.as_deref(), Some("http://www.example.com"));
        assert_eq!(
            config.template_variables.get("some-var"),
            Some(&serde_yaml::Value::String("some-value".to_string()))
        );
        assert!(config.archive_menu.is_some());

        let sections = config.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].repository.name.as_deref(), Some("foo/dogs-repo"));
        assert_eq!(sections[0].repository.r#ref.as_deref(), Some("some-sha"));
        assert_eq!(sections[0].directory.as_deref(), Some("concepts"));
        assert_eq!(sections[0].subnav_template.as_deref(), Some("dogs"));
        assert!(sections[0].preprocess);
        assert!(!sections[1].preprocess);

        assert_eq!(config.dita_sections.len(), 1);
        let dita = &config.dita_sections[0];
        assert_eq!(dita.directory, "dita-section");
        assert_eq!(dita.ditamap_location.as_deref(), Some("my-special-location"));
        assert_eq!(dita.ditaval_location.as_deref(), Some("my-ditaval"));
    }

    #[test]
    fn test_optional_keys_default() {
        let config = parse("book_repo: org/book\n").unwrap();

        assert!(config.template_variables.is_empty());
        assert!(config.archive_menu.is_none());
        assert!(config.sections.is_none());
        assert!(config.sections().is_empty());
        assert!(!config.has_versions());
    }

    #[test]
    fn test_empty_config() {
        for content in ["", "   \n", "~"] {
            match parse(content) {
                Err(Error::ConfigParse { message, .. }) => {
                    assert_eq!(message, "Your config.yml appears to be empty.")
                }
                other => panic!("expected ConfigParse, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_syntax_error() {
        match parse("book_repo: [unclosed") {
            Err(Error::ConfigParse { message, .. }) => {
                assert!(message.starts_with("There is a syntax error in your config file"))
            }
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_shape() {
        let result = parse("sections: not-a-list\n");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_from_file_missing() {
        let temp = tempfile::TempDir::new().unwrap();
        match from_file(temp.path().join("config.yml")) {
            Err(Error::ConfigParse { message, hint }) => {
                assert!(message.starts_with(
                    "The configuration file specified does not exist. Please create a config YAML file"
                ));
                assert!(hint.is_some());
            }
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_reads_document() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let config = from_file(&path).unwrap();
        assert_eq!(config.book_repo.as_deref(), Some("some-org/some-repo"));
    }

    #[test]
    fn test_book_repo_missing() {
        let config = parse("sections: []\n").unwrap();
        match config.book_repo() {
            Err(Error::ConfigurationMissing { field, .. }) => assert_eq!(field, "book_repo"),
            other => panic!("expected ConfigurationMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_full_config() {
        parse(FULL_CONFIG).unwrap().validate().unwrap();
    }

    #[test]
    fn test_validate_requires_ditamap_location() {
        let yaml = r#"
book_repo: org/book
dita_sections:
  - repository:
      name: fantastic/dogs-repo
    directory: dogs
"#;
        let err = parse(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("ditamap_location"));
    }

    #[test]
    fn test_validate_without_dita_sections() {
        parse("book_repo: org/book\n").unwrap().validate().unwrap();
    }

    #[test]
    fn test_validate_requires_section_name() {
        let yaml = r#"
book_repo: org/book
sections:
  - repository:
      ref: v1
"#;
        match parse(yaml).unwrap().validate() {
            Err(Error::ConfigurationMissing { field, context }) => {
                assert_eq!(field, "repository.name");
                assert_eq!(context.as_deref(), Some("sections[0]"));
            }
            other => panic!("expected ConfigurationMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_directories() {
        let yaml = r#"
book_repo: org/book
sections:
  - repository:
      name: org-a/docs
  - repository:
      name: org-b/docs
"#;
        let err = parse(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("'docs' is used more than once"));
    }
}
