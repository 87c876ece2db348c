//! Task orchestration: assemble the scanner configuration
//!
//! Runs the branch/pull-request resolver, folds in user-supplied extra
//! properties, and produces the pipeline variables later tasks read:
//! the scanner mode, the endpoint descriptor (secret) and the JSON-encoded
//! property map.

use crate::branch;
use crate::context::BuildContext;
use crate::endpoint::Endpoint;
use crate::error::PrepareError;
use crate::props::PropertyBag;
use crate::scanner::Scanner;
use crate::vsts::DefaultBranchLookup;

pub const SCANNER_MODE_VAR: &str = "SONARQUBE_SCANNER_MODE";
pub const ENDPOINT_VAR: &str = "SONARQUBE_ENDPOINT";
pub const SCANNER_PARAMS_VAR: &str = "SONARQUBE_SCANNER_PARAMS";

/// A pipeline variable to publish for later tasks in the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineVariable {
    pub name: String,
    pub value: String,
    pub secret: bool,
}

impl PipelineVariable {
    fn new(name: &str, value: impl Into<String>, secret: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            secret,
        }
    }

    /// Azure logging command that sets this variable when written to stdout.
    pub fn logging_command(&self) -> String {
        let secret = if self.secret { ";issecret=true" } else { "" };
        format!(
            "##vso[task.setvariable variable={}{}]{}",
            self.name, secret, self.value
        )
    }
}

/// Result of the prepare step.
#[derive(Debug, Clone)]
pub struct PrepareOutput {
    pub variables: Vec<PipelineVariable>,
}

impl PrepareOutput {
    /// Whether the resolver decided the scanner run should be skipped
    /// (unsupported provider on a pull-request build).
    pub fn scanner_skipped(&self) -> bool {
        self.variables
            .iter()
            .find(|v| v.name == SCANNER_PARAMS_VAR)
            .is_some_and(|v| v.value.contains(r#""sonar.scanner.skip":"true""#))
    }
}

/// Assemble the scanner configuration for this build.
///
/// Merge order: endpoint properties, then scanner properties, then the
/// resolved branch/pull-request properties, then user-supplied extra
/// properties. Later entries overwrite earlier ones, so `extra_properties`
/// always has the last word.
pub fn prepare(
    endpoint: &Endpoint,
    scanner: &Scanner,
    ctx: &BuildContext,
    extra_properties: &str,
    lookup: &dyn DefaultBranchLookup,
) -> Result<PrepareOutput, PrepareError> {
    let mut resolved = branch::resolve(endpoint.kind, ctx, lookup);
    resolved.merge(PropertyBag::parse_extra(extra_properties));

    let mut params = endpoint.to_properties();
    params.merge(scanner.to_properties());
    params.merge(resolved);

    Ok(PrepareOutput {
        variables: vec![
            PipelineVariable::new(SCANNER_MODE_VAR, scanner.mode().as_str(), false),
            PipelineVariable::new(ENDPOINT_VAR, endpoint.to_json()?, true),
            PipelineVariable::new(SCANNER_PARAMS_VAR, params.to_clean_json(), false),
        ],
    })
}
