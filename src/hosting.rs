//! # Hosting API Client
//!
//! Head lookups, tag creation, and tag listing go through the repository
//! host's REST API rather than through a working copy, so they work without
//! cloning anything.
//!
//! The `HostingApi` trait is the seam: `GitHubApi` talks to the real service
//! with a blocking `reqwest` client, and tests substitute their own
//! implementation.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

const TAGS_PAGE_SIZE: usize = 100;

/// Remote operations a Repository Handle needs from the hosting service.
pub trait HostingApi: Send + Sync {
    /// Commit id at the head of `full_name`, on `reference` when given and
    /// on the default branch otherwise.
    fn head_sha(
        &self,
        full_name: &str,
        reference: Option<&str>,
        credential: Option<&str>,
    ) -> Result<String>;

    /// Create a lightweight tag `tag` pointing at `sha`.
    fn create_tag(
        &self,
        full_name: &str,
        tag: &str,
        sha: &str,
        credential: Option<&str>,
    ) -> Result<()>;

    /// Names of every tag in `full_name`.
    fn tags(&self, full_name: &str, credential: Option<&str>) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// `HostingApi` backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    client: Client,
    base_url: Url,
    timeout: Duration,
    /// Used when the caller does not pass a credential of its own
    default_token: Option<String>,
}

impl GitHubApi {
    /// Build a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: &str, default_token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::Network {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bookbinder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            default_token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::Network {
            url: format!("{}{}", self.base_url, path),
            message: e.to_string(),
        })
    }

    fn authorize(&self, request: RequestBuilder, credential: Option<&str>) -> RequestBuilder {
        let request = request.header("Accept", "application/vnd.github+json");
        match credential.or(self.default_token.as_deref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, full_name: &str, url: &Url, request: RequestBuilder) -> Result<Response> {
        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    operation: format!("request to {}", url),
                    limit: self.timeout,
                }
            } else {
                Error::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(Error::RepositoryNotFound {
                repository: full_name.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::RepositoryAccessDenied {
                    repository: full_name.to_string(),
                })
            }
            status => {
                let body = response.text().unwrap_or_default();
                Err(Error::Network {
                    url: url.to_string(),
                    message: format!("{}: {}", status, body),
                })
            }
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
        response.json::<T>().map_err(|e| Error::Network {
            url: url.to_string(),
            message: format!("unexpected response body: {}", e),
        })
    }
}

impl HostingApi for GitHubApi {
    fn head_sha(
        &self,
        full_name: &str,
        reference: Option<&str>,
        credential: Option<&str>,
    ) -> Result<String> {
        let mut url = self.endpoint(&format!("repos/{}/commits", full_name))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("per_page", "1");
            if let Some(reference) = reference {
                query.append_pair("sha", reference);
            }
        }

        let request = self.authorize(self.client.get(url.clone()), credential);
        let response = self.send(full_name, &url, request)?;
        let commits: Vec<CommitEntry> = Self::decode(&url, response)?;

        commits
            .into_iter()
            .next()
            .map(|commit| commit.sha)
            .ok_or_else(|| Error::Network {
                url: url.to_string(),
                message: format!("{} has no commits", full_name),
            })
    }

    fn create_tag(
        &self,
        full_name: &str,
        tag: &str,
        sha: &str,
        credential: Option<&str>,
    ) -> Result<()> {
        let url = self.endpoint(&format!("repos/{}/git/refs", full_name))?;
        let body = serde_json::json!({
            "ref": format!("refs/tags/{}", tag),
            "sha": sha,
        });

        let request = self.authorize(self.client.post(url.clone()).json(&body), credential);
        self.send(full_name, &url, request)?;
        log::debug!("created tag {} on {} at {}", tag, full_name, sha);
        Ok(())
    }

    fn tags(&self, full_name: &str, credential: Option<&str>) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for page in 1.. {
            let mut url = self.endpoint(&format!("repos/{}/tags", full_name))?;
            url.query_pairs_mut()
                .append_pair("per_page", &TAGS_PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());

            let request = self.authorize(self.client.get(url.clone()), credential);
            let response = self.send(full_name, &url, request)?;
            let entries: Vec<TagEntry> = Self::decode(&url, response)?;

            let last_page = entries.len() < TAGS_PAGE_SIZE;
            names.extend(entries.into_iter().map(|entry| entry.name));
            if last_page {
                break;
            }
        }

        Ok(names)
    }
}
