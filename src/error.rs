//! Prepare-task error types.

use thiserror::Error;

/// Errors that can fail the prepare task.
///
/// Only configuration problems are fatal here; transient failures (such as
/// the default-branch lookup) are recovered locally and never surface as a
/// `PrepareError`.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("unable to get credential to perform REST API calls (scheme: '{scheme}')")]
    UnsupportedCredentialScheme { scheme: String },

    #[error("service connection has no access token")]
    MissingAccessToken,

    #[error("unknown scanner mode: '{0}' (expected MSBuild, CLI or Other)")]
    UnknownScannerMode(String),

    #[error("failed to encode endpoint descriptor: {0}")]
    Json(#[from] serde_json::Error),
}
