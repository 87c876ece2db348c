//! Prepare step for SonarQube/SonarCloud analysis on Azure Pipelines
//!
//! Runs before the scanner in a build job and turns the agent's build
//! metadata into the flat property map the scanner consumes:
//!
//! - resolves branch / pull-request context (`sonar.pullrequest.*`,
//!   `sonar.branch.name`), querying the collection's Git REST API for the
//!   repository's default branch when needed
//! - folds in endpoint, scanner-mode and user-supplied extra properties
//! - publishes the result as pipeline variables (`SONARQUBE_SCANNER_MODE`,
//!   `SONARQUBE_ENDPOINT`, `SONARQUBE_SCANNER_PARAMS`)
//!
//! The only fatal condition is a misconfigured service connection (a
//! non-OAuth credential scheme). Everything else degrades: a failed
//! default-branch lookup falls back to `refs/heads/master`, and an
//! unsupported repository provider on a pull-request build soft-disables
//! the scanner via `sonar.scanner.skip` instead of failing the job.

pub mod branch;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod output;
pub mod prepare;
pub mod props;
pub mod scanner;
pub mod vsts;

pub use branch::branch_name;
pub use context::{BuildContext, Provider};
pub use endpoint::{Endpoint, EndpointKind};
pub use error::PrepareError;
pub use prepare::{prepare, PipelineVariable, PrepareOutput};
pub use props::PropertyBag;
pub use scanner::{ProjectSettings, Scanner, ScannerMode};
pub use vsts::{DefaultBranchLookup, GitApiClient, SystemConnection};
