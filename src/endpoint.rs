//! Analysis endpoint descriptor
//!
//! Identifies which backend the scan targets: the hosted SonarCloud service
//! or a self-hosted SonarQube server. Several behaviors branch on this
//! (pull-request decoration, default-branch discovery), so the kind is an
//! enum matched exhaustively rather than a string compared at each site.

use serde::Serialize;

use crate::props::PropertyBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndpointKind {
    SonarCloud,
    SonarQube,
}

/// Connection settings for the analysis server.
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl Endpoint {
    pub fn new(
        kind: EndpointKind,
        url: impl Into<String>,
        token: Option<String>,
        organization: Option<String>,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            token,
            organization,
        }
    }

    /// JSON form stored in the `SONARQUBE_ENDPOINT` pipeline variable for
    /// later tasks. Marked secret by the caller since it carries the token.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Scanner properties contributed by the endpoint itself.
    pub fn to_properties(&self) -> PropertyBag {
        let mut props = PropertyBag::new();
        props.set("sonar.host.url", &self.url);
        if let Some(token) = &self.token {
            props.set("sonar.login", token);
        }
        if let Some(organization) = &self.organization {
            props.set("sonar.organization", organization);
        }
        props
    }
}
