//! Azure DevOps Git REST client for default-branch discovery
//!
//! One authenticated call: fetch a repository descriptor and read its
//! `defaultBranch` ref. The resolver treats every failure here as
//! recoverable, so errors stay local to this module's `Result` and are
//! never allowed to abort the task.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::error::PrepareError;

/// Request timeout in seconds
const HTTP_TIMEOUT_SECS: u64 = 30;

/// REST API version understood by both Azure DevOps Services and Server
const API_VERSION: &str = "5.0";

/// Failures of the default-branch lookup. Always recoverable.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("git API request failed: {0}")]
    Request(String),

    #[error("failed to parse repository response: {0}")]
    Parse(String),

    #[error("repository response has no defaultBranch")]
    MissingDefaultBranch,

    #[error("no collection URL available for the git API")]
    NoCollectionUrl,
}

/// Capability to resolve a repository's default branch ref.
///
/// Injected into the resolver so tests can substitute a fake without any
/// network involvement.
pub trait DefaultBranchLookup {
    /// Full ref of the repository's default branch, e.g. `refs/heads/main`.
    fn default_branch(&self, repository: &str, project: &str) -> Result<String, LookupError>;
}

#[derive(Deserialize)]
struct Repository {
    #[serde(rename = "defaultBranch")]
    default_branch: Option<String>,
}

/// Client for the collection's `_apis/git` endpoints.
pub struct GitApiClient {
    collection_uri: String,
    access_token: String,
}

impl GitApiClient {
    pub fn new(collection_uri: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut collection_uri = collection_uri.into();
        while collection_uri.ends_with('/') {
            collection_uri.pop();
        }
        Self {
            collection_uri,
            access_token: access_token.into(),
        }
    }
}

impl DefaultBranchLookup for GitApiClient {
    fn default_branch(&self, repository: &str, project: &str) -> Result<String, LookupError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}?api-version={}",
            self.collection_uri, project, repository, API_VERSION
        );

        let repo: Repository = ureq::get(&url)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .set("Authorization", &format!("Bearer {}", self.access_token))
            .set("Accept", "application/json")
            .call()
            .map_err(|e| LookupError::Request(e.to_string()))?
            .into_json()
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        repo.default_branch.ok_or(LookupError::MissingDefaultBranch)
    }
}

/// Lookup used when the build context carries no collection URL.
/// Always fails, so the resolver falls back to its static default.
pub struct UnavailableLookup;

impl DefaultBranchLookup for UnavailableLookup {
    fn default_branch(&self, _repository: &str, _project: &str) -> Result<String, LookupError> {
        Err(LookupError::NoCollectionUrl)
    }
}

/// Credentials of the `SYSTEMVSSCONNECTION` service connection, as the
/// agent exposes them to task processes.
#[derive(Debug, Clone, Default)]
pub struct SystemConnection {
    pub scheme: Option<String>,
    pub access_token: Option<String>,
}

impl SystemConnection {
    pub fn from_env() -> Self {
        Self {
            scheme: read_env("ENDPOINT_AUTH_SCHEME_SYSTEMVSSCONNECTION"),
            access_token: read_env("ENDPOINT_AUTH_PARAMETER_SYSTEMVSSCONNECTION_ACCESSTOKEN"),
        }
    }

    /// Bearer token for REST API calls.
    ///
    /// Only the OAuth scheme is supported; anything else is a configuration
    /// error and the one condition that fails the whole task.
    pub fn bearer_token(&self) -> Result<&str, PrepareError> {
        let scheme = self.scheme.as_deref().unwrap_or("");
        if !scheme.eq_ignore_ascii_case("oauth") {
            return Err(PrepareError::UnsupportedCredentialScheme {
                scheme: scheme.to_string(),
            });
        }
        self.access_token
            .as_deref()
            .ok_or(PrepareError::MissingAccessToken)
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
