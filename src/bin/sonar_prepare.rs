//! sonar-prepare - configure SonarQube/SonarCloud analysis for the current build
//!
//! Usage:
//!   sonar-prepare --endpoint sonarcloud --token <token> --scanner-mode CLI \
//!       --project-key org:store --extra-properties 'sonar.exclusions=**/vendor/**'
//!
//! Build metadata (pull-request id, branches, repository name, ...) is read
//! from the agent's environment variables. The resulting configuration is
//! published as pipeline variables via logging commands on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sonar_prepare::{
    output, prepare, BuildContext, DefaultBranchLookup, Endpoint, EndpointKind, GitApiClient,
    ProjectSettings, Scanner, ScannerMode, SystemConnection,
};

#[derive(Clone, Copy, ValueEnum)]
enum EndpointArg {
    /// Hosted SonarCloud service
    Sonarcloud,
    /// Self-hosted SonarQube server
    Sonarqube,
}

impl From<EndpointArg> for EndpointKind {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::Sonarcloud => EndpointKind::SonarCloud,
            EndpointArg::Sonarqube => EndpointKind::SonarQube,
        }
    }
}

#[derive(Parser)]
#[command(name = "sonar-prepare")]
#[command(about = "Prepare SonarQube/SonarCloud analysis properties for this build")]
#[command(version)]
struct Cli {
    /// Analysis backend to target
    #[arg(long, value_enum, default_value = "sonarcloud")]
    endpoint: EndpointArg,

    /// Analysis server URL
    #[arg(long, env = "SONAR_HOST_URL", default_value = "https://sonarcloud.io")]
    server_url: String,

    /// Authentication token for the analysis server
    #[arg(long, env = "SONAR_TOKEN")]
    token: Option<String>,

    /// SonarCloud organization key
    #[arg(long, env = "SONAR_ORGANIZATION")]
    organization: Option<String>,

    /// Scanner flavor that will run later (MSBuild, CLI or Other)
    #[arg(long, default_value = "CLI")]
    scanner_mode: String,

    /// Project key (CLI mode)
    #[arg(long)]
    project_key: Option<String>,

    /// Project display name (CLI mode)
    #[arg(long)]
    project_name: Option<String>,

    /// Project version (CLI mode)
    #[arg(long)]
    project_version: Option<String>,

    /// Source directories to analyze (CLI mode)
    #[arg(long)]
    sources: Option<String>,

    /// Newline-delimited key=value properties; lines starting with '#' are ignored
    #[arg(long, default_value = "")]
    extra_properties: String,

    /// Read extra properties from a file instead
    #[arg(long, conflicts_with = "extra_properties")]
    extra_properties_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let endpoint = Endpoint::new(
        cli.endpoint.into(),
        cli.server_url,
        cli.token,
        cli.organization,
    );
    let scanner = Scanner::new(
        ScannerMode::parse(&cli.scanner_mode)?,
        ProjectSettings {
            key: cli.project_key,
            name: cli.project_name,
            version: cli.project_version,
            sources: cli.sources,
        },
    );

    let extra_properties = match &cli.extra_properties_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read extra properties: {}", path.display()))?,
        None => cli.extra_properties,
    };

    let ctx = BuildContext::from_env();

    // The git API client needs the collection URL and an OAuth access token.
    // A missing collection URL just disables the lookup; a present one with a
    // non-OAuth credential scheme is a configuration error and fails here.
    let lookup: Box<dyn DefaultBranchLookup> = match &ctx.collection_uri {
        Some(uri) => {
            let connection = SystemConnection::from_env();
            Box::new(GitApiClient::new(uri, connection.bearer_token()?))
        }
        None => Box::new(sonar_prepare::vsts::UnavailableLookup),
    };

    output::action(&format!(
        "Preparing {} analysis",
        match endpoint.kind {
            EndpointKind::SonarCloud => "SonarCloud",
            EndpointKind::SonarQube => "SonarQube",
        }
    ));

    let result = prepare(&endpoint, &scanner, &ctx, &extra_properties, lookup.as_ref())?;

    for variable in &result.variables {
        println!("{}", variable.logging_command());
    }

    if result.scanner_skipped() {
        output::warning("scanner run will be skipped for this build");
    }
    output::success("analysis properties published");

    Ok(())
}
