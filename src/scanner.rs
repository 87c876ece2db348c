//! Scanner invocation settings
//!
//! The prepare step does not run the scanner; it only records which flavor
//! will run later and, for CLI mode, the project settings the scanner needs
//! up front. MSBuild and Other modes wire their settings in later tasks.

use crate::error::PrepareError;
use crate::props::PropertyBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerMode {
    MsBuild,
    Cli,
    Other,
}

impl ScannerMode {
    /// Parse a task input value, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, PrepareError> {
        match raw.to_ascii_lowercase().as_str() {
            "msbuild" => Ok(ScannerMode::MsBuild),
            "cli" => Ok(ScannerMode::Cli),
            "other" => Ok(ScannerMode::Other),
            _ => Err(PrepareError::UnknownScannerMode(raw.to_string())),
        }
    }

    /// Canonical spelling stored in the `SONARQUBE_SCANNER_MODE` variable.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScannerMode::MsBuild => "MSBuild",
            ScannerMode::Cli => "CLI",
            ScannerMode::Other => "Other",
        }
    }
}

/// Project identification for CLI-mode scans.
#[derive(Debug, Clone, Default)]
pub struct ProjectSettings {
    pub key: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub sources: Option<String>,
}

pub struct Scanner {
    mode: ScannerMode,
    project: ProjectSettings,
}

impl Scanner {
    pub fn new(mode: ScannerMode, project: ProjectSettings) -> Self {
        Self { mode, project }
    }

    pub fn mode(&self) -> ScannerMode {
        self.mode
    }

    /// Scanner properties contributed by the invocation mode.
    pub fn to_properties(&self) -> PropertyBag {
        let mut props = PropertyBag::new();
        match self.mode {
            ScannerMode::Cli => {
                if let Some(key) = &self.project.key {
                    props.set("sonar.projectKey", key);
                }
                if let Some(name) = &self.project.name {
                    props.set("sonar.projectName", name);
                }
                if let Some(version) = &self.project.version {
                    props.set("sonar.projectVersion", version);
                }
                if let Some(sources) = &self.project.sources {
                    props.set("sonar.sources", sources);
                }
            }
            ScannerMode::MsBuild | ScannerMode::Other => {}
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_case_insensitive() {
        assert_eq!(ScannerMode::parse("MSBuild").unwrap(), ScannerMode::MsBuild);
        assert_eq!(ScannerMode::parse("msbuild").unwrap(), ScannerMode::MsBuild);
        assert_eq!(ScannerMode::parse("CLI").unwrap(), ScannerMode::Cli);
        assert_eq!(ScannerMode::parse("other").unwrap(), ScannerMode::Other);
    }

    #[test]
    fn test_mode_parse_rejects_unknown() {
        assert!(matches!(
            ScannerMode::parse("gradle"),
            Err(PrepareError::UnknownScannerMode(ref m)) if m == "gradle"
        ));
    }

    #[test]
    fn test_mode_round_trips_canonical_spelling() {
        for mode in [ScannerMode::MsBuild, ScannerMode::Cli, ScannerMode::Other] {
            assert_eq!(ScannerMode::parse(mode.as_str()).unwrap(), mode);
        }
    }

    #[test]
    fn test_cli_mode_contributes_project_properties() {
        let scanner = Scanner::new(
            ScannerMode::Cli,
            ProjectSettings {
                key: Some("org:store".to_string()),
                name: Some("Store".to_string()),
                version: Some("1.2.0".to_string()),
                sources: Some("src".to_string()),
            },
        );
        let props = scanner.to_properties();
        assert_eq!(props.get("sonar.projectKey"), Some("org:store"));
        assert_eq!(props.get("sonar.projectName"), Some("Store"));
        assert_eq!(props.get("sonar.projectVersion"), Some("1.2.0"));
        assert_eq!(props.get("sonar.sources"), Some("src"));
    }

    #[test]
    fn test_msbuild_mode_contributes_nothing() {
        let scanner = Scanner::new(
            ScannerMode::MsBuild,
            ProjectSettings {
                key: Some("ignored".to_string()),
                ..Default::default()
            },
        );
        assert!(scanner.to_properties().is_empty());
    }
}
