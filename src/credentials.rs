//! # Credentials
//!
//! The credentials document (`credentials.yml`) lives in its own repository,
//! named by `cred_repo` in the book configuration. It has two sections:
//! `aws` and `cloud_foundry`.
//!
//! Sections are validated when they are asked for, not when the document is
//! loaded, so a command that only needs AWS access is not blocked by a
//! malformed routing table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::Value;

use crate::defaults::{CREDENTIALS_FILE_NAME, DEFAULT_BRANCH};
use crate::error::{Error, Result};
use crate::repository::RepositoryHandle;

/// Domain name mapped to the hostnames routed under it.
pub type Routes = BTreeMap<String, Vec<String>>;

fn malformed(message: impl Into<String>) -> Error {
    Error::CredentialMalformed {
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AwsCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub green_builds_bucket: String,
}

/// Deployment target whose routes and space are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(malformed(format!("Unknown environment '{}'", other))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCfCredentials {
    api_endpoint: String,
    staging_host: Value,
    production_host: Value,
    staging_space: String,
    production_space: String,
    app_name: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    organization: String,
}

/// Cloud Foundry settings for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfCredentials {
    pub environment: Environment,
    pub api_endpoint: String,
    pub app_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub organization: String,
    pub space: String,
    pub routes: Routes,
}

impl CfCredentials {
    pub fn from_value(value: &Value, environment: Environment) -> Result<Self> {
        let raw: RawCfCredentials =
            serde_yaml::from_value(value.clone()).map_err(|e| malformed(e.to_string()))?;

        let (hosts, space) = match environment {
            Environment::Staging => (&raw.staging_host, raw.staging_space),
            Environment::Production => (&raw.production_host, raw.production_space),
        };

        Ok(Self {
            environment,
            routes: validate_routes(hosts)?,
            api_endpoint: raw.api_endpoint,
            app_name: raw.app_name,
            username: raw.username,
            password: raw.password,
            organization: raw.organization,
            space,
        })
    }
}

/// Check a `<env>_host` routing table and turn it into `Routes`.
pub fn validate_routes(value: &Value) -> Result<Routes> {
    let table = value
        .as_mapping()
        .ok_or_else(|| malformed("Routes in credentials must map each domain to a list of hosts."))?;

    let mut routes = Routes::new();
    for (domain, hosts) in table {
        let domain = match domain {
            Value::String(domain) => domain,
            _ => return Err(malformed("Each domain in credentials must be a single string.")),
        };

        if !domain.contains('.') {
            return Err(malformed(format!(
                "Domain {} in credentials must contain a web extension, e.g. '.com'.",
                domain
            )));
        }

        let entries = match hosts {
            Value::Null => {
                return Err(malformed(format!(
                    "Did you mean to add a list of hosts for domain {}? Check your credentials.",
                    domain
                )))
            }
            Value::Sequence(entries) => entries,
            _ => {
                return Err(malformed(format!(
                    "Hosts in credentials must be nested as an array under the desired domain {}.",
                    domain
                )))
            }
        };

        let hostnames = entries
            .iter()
            .map(|entry| match entry {
                Value::String(host) => Ok(host.clone()),
                _ => Err(malformed(format!(
                    "Did you mean to provide a hostname for the domain {}? Check your credentials.",
                    domain
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        routes.insert(domain.clone(), hostnames);
    }

    Ok(routes)
}

#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
    #[serde(default)]
    aws: Option<Value>,
    #[serde(default)]
    cloud_foundry: Option<Value>,
}

/// A loaded credentials document.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    aws: Option<Value>,
    cloud_foundry: Option<Value>,
}

impl Credentials {
    pub fn parse(yaml: &str) -> Result<Self> {
        let raw: Option<RawCredentials> =
            serde_yaml::from_str(yaml).map_err(|e| malformed(e.to_string()))?;
        let raw = raw.unwrap_or_default();

        Ok(Self {
            aws: raw.aws,
            cloud_foundry: raw.cloud_foundry,
        })
    }

    pub fn aws(&self) -> Result<AwsCredentials> {
        let value = self
            .aws
            .as_ref()
            .ok_or_else(|| malformed("key not found: 'aws'"))?;
        serde_yaml::from_value(value.clone()).map_err(|e| malformed(e.to_string()))
    }

    pub fn cloud_foundry(&self, environment: Environment) -> Result<CfCredentials> {
        let value = self
            .cloud_foundry
            .as_ref()
            .ok_or_else(|| malformed("key not found: 'cloud_foundry'"))?;
        CfCredentials::from_value(value, environment)
    }
}

/// Reads `credentials.yml` from the credential repository.
pub struct RemoteYamlCredentialProvider {
    repository: RepositoryHandle,
}

impl RemoteYamlCredentialProvider {
    pub fn new(repository: RepositoryHandle) -> Self {
        Self { repository }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        log::info!("Processing {}", self.repository.full_name());
        let content = self
            .repository
            .read_file_at(CREDENTIALS_FILE_NAME, DEFAULT_BRANCH)?;
        Credentials::parse(&content)
    }
}
