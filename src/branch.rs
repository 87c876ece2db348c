//! Branch and pull-request context resolution
//!
//! Decides which `sonar.pullrequest.*` / `sonar.branch.*` properties a build
//! gets, based on the endpoint kind, the pull-request state and the
//! repository provider. Evaluated in a fixed order; the first matching case
//! wins.

use crate::context::{BuildContext, Provider};
use crate::endpoint::EndpointKind;
use crate::output;
use crate::props::PropertyBag;
use crate::vsts::DefaultBranchLookup;

/// Fallback when the repository's default branch cannot be determined.
pub const DEFAULT_BRANCH: &str = "refs/heads/master";

/// Display name of a branch ref: strips a leading `refs/heads/`.
/// Idempotent; already-short names pass through unchanged.
pub fn branch_name(full: &str) -> &str {
    full.strip_prefix("refs/heads/").unwrap_or(full)
}

/// Resolve the branch/pull-request properties for this build.
///
/// Pull-request builds against SonarCloud get `sonar.pullrequest.*` keys;
/// ordinary SonarCloud builds off the default branch get `sonar.branch.name`.
/// Self-hosted SonarQube endpoints get neither: pull-request decoration is
/// not wired through this task for them.
pub fn resolve(
    kind: EndpointKind,
    ctx: &BuildContext,
    lookup: &dyn DefaultBranchLookup,
) -> PropertyBag {
    let mut props = PropertyBag::new();

    if let Some(pr_id) = &ctx.pull_request_id {
        match kind {
            EndpointKind::SonarCloud => resolve_pull_request(&mut props, pr_id, ctx),
            EndpointKind::SonarQube => {}
        }
    } else if kind == EndpointKind::SonarCloud {
        let default_branch = resolve_default_branch(ctx, lookup);
        if let Some(current) = &ctx.source_branch {
            if branch_name(current) != branch_name(&default_branch) {
                props.set("sonar.branch.name", branch_name(current));
            }
        }
    }

    props
}

fn resolve_pull_request(props: &mut PropertyBag, pr_id: &str, ctx: &BuildContext) {
    props.set("sonar.pullrequest.id", pr_id);
    if let Some(target) = &ctx.pr_target_branch {
        props.set("sonar.pullrequest.base", branch_name(target));
    }
    if let Some(source) = &ctx.pr_source_branch {
        props.set("sonar.pullrequest.branch", branch_name(source));
    }

    match ctx.provider() {
        Provider::TfsGit => {
            props.set("sonar.pullrequest.provider", "vsts");
            if let Some(uri) = &ctx.collection_uri {
                props.set("sonar.pullrequest.vsts.instanceUrl", uri);
            }
            if let Some(project) = &ctx.team_project {
                props.set("sonar.pullrequest.vsts.project", project);
            }
            if let Some(repo) = &ctx.repository_name {
                props.set("sonar.pullrequest.vsts.gitRepo", repo);
            }
        }
        Provider::GitHub => {
            props.set("sonar.pullrequest.provider", "github");
            if let Some(repo) = &ctx.repository_name {
                props.set("sonar.pullrequest.github.repository", repo);
            }
        }
        Provider::Unknown(raw) => {
            output::warning(&format!("unknown repository provider '{raw}'"));
            props.set("sonar.scanner.skip", "true");
        }
    }
}

/// Default branch of the repository being built.
///
/// Only TfsGit repositories can be queried over the collection's REST API;
/// any lookup failure falls back to [`DEFAULT_BRANCH`] with a warning. This
/// path must never abort the pipeline.
fn resolve_default_branch(ctx: &BuildContext, lookup: &dyn DefaultBranchLookup) -> String {
    if ctx.provider() != Provider::TfsGit {
        return DEFAULT_BRANCH.to_string();
    }
    let (Some(repo), Some(project)) = (&ctx.repository_name, &ctx.team_project) else {
        return DEFAULT_BRANCH.to_string();
    };
    match lookup.default_branch(repo, project) {
        Ok(branch) => {
            output::detail(&format!("default branch of this repository is '{branch}'"));
            branch
        }
        Err(e) => {
            output::warning(&format!(
                "unable to get default branch, defaulting to 'master': {e}"
            ));
            DEFAULT_BRANCH.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vsts::LookupError;

    /// Canned lookup result, recording whether it was called.
    struct FakeLookup {
        result: Result<String, ()>,
        called: std::cell::Cell<bool>,
    }

    impl FakeLookup {
        fn returning(branch: &str) -> Self {
            Self {
                result: Ok(branch.to_string()),
                called: std::cell::Cell::new(false),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(()),
                called: std::cell::Cell::new(false),
            }
        }
    }

    impl DefaultBranchLookup for FakeLookup {
        fn default_branch(&self, _repo: &str, _project: &str) -> Result<String, LookupError> {
            self.called.set(true);
            self.result
                .clone()
                .map_err(|_| LookupError::Request("connection refused".to_string()))
        }
    }

    fn tfs_pr_context() -> BuildContext {
        BuildContext {
            collection_uri: Some("https://dev.azure.com/acme/".to_string()),
            pull_request_id: Some("42".to_string()),
            provider: Some("TfsGit".to_string()),
            pr_target_branch: Some("refs/heads/main".to_string()),
            pr_source_branch: Some("refs/heads/feature/login".to_string()),
            team_project: Some("Store".to_string()),
            repository_name: Some("store-backend".to_string()),
            source_branch: Some("refs/pull/42/merge".to_string()),
        }
    }

    // branch_name normalization

    #[test]
    fn test_branch_name_strips_refs_heads() {
        assert_eq!(branch_name("refs/heads/main"), "main");
        assert_eq!(branch_name("refs/heads/feature/login"), "feature/login");
    }

    #[test]
    fn test_branch_name_passthrough_on_short_name() {
        assert_eq!(branch_name("main"), "main");
        assert_eq!(branch_name(""), "");
        assert_eq!(branch_name("refs/tags/v1.0"), "refs/tags/v1.0");
    }

    #[test]
    fn test_branch_name_is_idempotent() {
        for input in ["refs/heads/main", "main", "refs/heads/refs/heads/x", ""] {
            let once = branch_name(input);
            assert_eq!(branch_name(once), once);
        }
    }

    // Pull-request builds

    #[test]
    fn test_pr_on_tfsgit_sets_vsts_properties() {
        let ctx = tfs_pr_context();
        let props = resolve(EndpointKind::SonarCloud, &ctx, &FakeLookup::failing());

        assert_eq!(props.get("sonar.pullrequest.id"), Some("42"));
        assert_eq!(props.get("sonar.pullrequest.base"), Some("main"));
        assert_eq!(props.get("sonar.pullrequest.branch"), Some("feature/login"));
        assert_eq!(props.get("sonar.pullrequest.provider"), Some("vsts"));
        assert_eq!(
            props.get("sonar.pullrequest.vsts.instanceUrl"),
            Some("https://dev.azure.com/acme/")
        );
        assert_eq!(props.get("sonar.pullrequest.vsts.project"), Some("Store"));
        assert_eq!(
            props.get("sonar.pullrequest.vsts.gitRepo"),
            Some("store-backend")
        );
        assert!(!props.contains("sonar.pullrequest.github.repository"));
        assert!(!props.contains("sonar.scanner.skip"));
    }

    #[test]
    fn test_pr_on_github_sets_github_properties() {
        let mut ctx = tfs_pr_context();
        ctx.provider = Some("GitHub".to_string());
        let props = resolve(EndpointKind::SonarCloud, &ctx, &FakeLookup::failing());

        assert_eq!(props.get("sonar.pullrequest.provider"), Some("github"));
        assert_eq!(
            props.get("sonar.pullrequest.github.repository"),
            Some("store-backend")
        );
        assert!(!props.contains("sonar.pullrequest.vsts.instanceUrl"));
        assert!(!props.contains("sonar.pullrequest.vsts.project"));
        assert!(!props.contains("sonar.pullrequest.vsts.gitRepo"));
    }

    #[test]
    fn test_pr_on_unknown_provider_skips_scanner() {
        let mut ctx = tfs_pr_context();
        ctx.provider = Some("Svn".to_string());
        let props = resolve(EndpointKind::SonarCloud, &ctx, &FakeLookup::failing());

        assert_eq!(props.get("sonar.scanner.skip"), Some("true"));
        assert!(!props.contains("sonar.pullrequest.provider"));
        // id/base/branch are still recorded before the provider dispatch
        assert_eq!(props.get("sonar.pullrequest.id"), Some("42"));
    }

    #[test]
    fn test_pr_with_missing_provider_skips_scanner() {
        let mut ctx = tfs_pr_context();
        ctx.provider = None;
        let props = resolve(EndpointKind::SonarCloud, &ctx, &FakeLookup::failing());
        assert_eq!(props.get("sonar.scanner.skip"), Some("true"));
    }

    #[test]
    fn test_pr_on_sonarqube_sets_nothing() {
        let ctx = tfs_pr_context();
        let props = resolve(EndpointKind::SonarQube, &ctx, &FakeLookup::failing());
        assert!(props.is_empty());
    }

    #[test]
    fn test_pr_does_not_trigger_default_branch_lookup() {
        let ctx = tfs_pr_context();
        let lookup = FakeLookup::returning("refs/heads/main");
        resolve(EndpointKind::SonarCloud, &ctx, &lookup);
        assert!(!lookup.called.get());
    }

    #[test]
    fn test_pr_tolerates_absent_branches() {
        let mut ctx = tfs_pr_context();
        ctx.pr_target_branch = None;
        ctx.pr_source_branch = None;
        let props = resolve(EndpointKind::SonarCloud, &ctx, &FakeLookup::failing());
        assert_eq!(props.get("sonar.pullrequest.id"), Some("42"));
        assert!(!props.contains("sonar.pullrequest.base"));
        assert!(!props.contains("sonar.pullrequest.branch"));
    }

    // Branch builds

    fn tfs_branch_context(current: &str) -> BuildContext {
        BuildContext {
            pull_request_id: None,
            source_branch: Some(current.to_string()),
            ..tfs_pr_context()
        }
    }

    #[test]
    fn test_branch_build_on_default_branch_sets_no_name() {
        let ctx = tfs_branch_context("refs/heads/develop");
        let lookup = FakeLookup::returning("refs/heads/develop");
        let props = resolve(EndpointKind::SonarCloud, &ctx, &lookup);
        assert!(!props.contains("sonar.branch.name"));
        assert!(lookup.called.get());
    }

    #[test]
    fn test_branch_build_off_default_branch_sets_name() {
        let ctx = tfs_branch_context("refs/heads/feature-x");
        let lookup = FakeLookup::returning("refs/heads/develop");
        let props = resolve(EndpointKind::SonarCloud, &ctx, &lookup);
        assert_eq!(props.get("sonar.branch.name"), Some("feature-x"));
    }

    #[test]
    fn test_branch_build_lookup_failure_falls_back_to_master() {
        // A failing lookup behaves exactly as if the default were
        // refs/heads/master, and never propagates the error.
        let on_master = tfs_branch_context("refs/heads/master");
        let props = resolve(EndpointKind::SonarCloud, &on_master, &FakeLookup::failing());
        assert!(!props.contains("sonar.branch.name"));

        let off_master = tfs_branch_context("refs/heads/feature-x");
        let props = resolve(EndpointKind::SonarCloud, &off_master, &FakeLookup::failing());
        assert_eq!(props.get("sonar.branch.name"), Some("feature-x"));
    }

    #[test]
    fn test_branch_build_non_tfsgit_skips_lookup() {
        let mut ctx = tfs_branch_context("refs/heads/feature-x");
        ctx.provider = Some("GitHub".to_string());
        let lookup = FakeLookup::returning("refs/heads/develop");
        let props = resolve(EndpointKind::SonarCloud, &ctx, &lookup);
        // static default refs/heads/master applies, so feature-x differs
        assert!(!lookup.called.get());
        assert_eq!(props.get("sonar.branch.name"), Some("feature-x"));
    }

    #[test]
    fn test_branch_build_comparison_is_normalized() {
        let ctx = tfs_branch_context("refs/heads/develop");
        let lookup = FakeLookup::returning("develop");
        let props = resolve(EndpointKind::SonarCloud, &ctx, &lookup);
        assert!(!props.contains("sonar.branch.name"));
    }

    #[test]
    fn test_branch_build_missing_repo_metadata_falls_back() {
        let mut ctx = tfs_branch_context("refs/heads/feature-x");
        ctx.repository_name = None;
        let lookup = FakeLookup::returning("refs/heads/develop");
        let props = resolve(EndpointKind::SonarCloud, &ctx, &lookup);
        assert!(!lookup.called.get());
        assert_eq!(props.get("sonar.branch.name"), Some("feature-x"));
    }

    #[test]
    fn test_branch_build_without_current_branch_sets_nothing() {
        let mut ctx = tfs_branch_context("unused");
        ctx.source_branch = None;
        let props = resolve(
            EndpointKind::SonarCloud,
            &ctx,
            &FakeLookup::returning("refs/heads/develop"),
        );
        assert!(!props.contains("sonar.branch.name"));
    }

    #[test]
    fn test_sonarqube_branch_build_is_noop() {
        let ctx = tfs_branch_context("refs/heads/feature-x");
        let lookup = FakeLookup::returning("refs/heads/develop");
        let props = resolve(EndpointKind::SonarQube, &ctx, &lookup);
        assert!(props.is_empty());
        assert!(!lookup.called.get());
    }
}
