//! Build metadata from the agent's variable store
//!
//! The Azure agent exposes pipeline variables to task processes as
//! environment variables: the name is upper-cased and dots become
//! underscores (`System.TeamProject` -> `SYSTEM_TEAMPROJECT`). Every value
//! is optional; a set-but-empty variable counts as absent.

use std::fmt;

/// Source-control host of the repository being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    TfsGit,
    GitHub,
    /// Any other (or missing) `Build.Repository.Provider` value.
    Unknown(String),
}

impl Provider {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("TfsGit") => Provider::TfsGit,
            Some("GitHub") => Provider::GitHub,
            Some(other) => Provider::Unknown(other.to_string()),
            None => Provider::Unknown(String::from("<unset>")),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::TfsGit => write!(f, "TfsGit"),
            Provider::GitHub => write!(f, "GitHub"),
            Provider::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// Snapshot of the build variables the prepare step consumes.
///
/// Captured once at task start and passed explicitly from then on, so the
/// resolver never reads ambient global state.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    /// `System.TeamFoundationCollectionUri`
    pub collection_uri: Option<String>,
    /// `System.PullRequest.PullRequestId`
    pub pull_request_id: Option<String>,
    /// `Build.Repository.Provider`
    pub provider: Option<String>,
    /// `System.PullRequest.TargetBranch`
    pub pr_target_branch: Option<String>,
    /// `System.PullRequest.SourceBranch`
    pub pr_source_branch: Option<String>,
    /// `System.TeamProject`
    pub team_project: Option<String>,
    /// `Build.Repository.Name`
    pub repository_name: Option<String>,
    /// `Build.SourceBranch`
    pub source_branch: Option<String>,
}

impl BuildContext {
    /// Capture the build context from the agent environment.
    pub fn from_env() -> Self {
        Self {
            collection_uri: build_var("System.TeamFoundationCollectionUri"),
            pull_request_id: build_var("System.PullRequest.PullRequestId"),
            provider: build_var("Build.Repository.Provider"),
            pr_target_branch: build_var("System.PullRequest.TargetBranch"),
            pr_source_branch: build_var("System.PullRequest.SourceBranch"),
            team_project: build_var("System.TeamProject"),
            repository_name: build_var("Build.Repository.Name"),
            source_branch: build_var("Build.SourceBranch"),
        }
    }

    pub fn provider(&self) -> Provider {
        Provider::parse(self.provider.as_deref())
    }
}

/// Environment variable name for a pipeline variable.
fn env_name(variable: &str) -> String {
    variable.replace('.', "_").to_uppercase()
}

/// Read a pipeline variable; empty values count as absent.
fn build_var(variable: &str) -> Option<String> {
    std::env::var(env_name(variable))
        .ok()
        .filter(|v| !v.is_empty())
}
