//! Builder settings.

use serde::Deserialize;
use std::path::PathBuf;

use crate::pipeline::naming::ArtifactNaming;

/// Packaging configuration.
///
/// # Configuration
///
/// ```toml
/// [build]
/// entry_point = "sc_command.py"
/// naming = "versioned"
/// extension = "exe"
/// version_env = "VERSION"
/// service_url_env = "REDIS_URL"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    /// Application entry point handed to PyInstaller.
    ///
    /// Default: "main.py"
    pub entry_point: PathBuf,

    /// Artifact naming convention.
    ///
    /// Default: [`ArtifactNaming::Versioned`]
    pub naming: ArtifactNaming,

    /// Extension of the produced executable, without the dot.
    ///
    /// Default: the host executable extension ("exe" on Windows, empty elsewhere)
    pub extension: String,

    /// Environment variable holding the version string.
    ///
    /// Default: "VERSION"
    pub version_env: String,

    /// Environment variable holding the external service connection string.
    ///
    /// Default: "REDIS_URL"
    pub service_url_env: String,

    /// Name of the module-level version assignment rewritten before packaging.
    ///
    /// Default: "VERSION"
    pub version_variable: String,

    /// Token in the entry point replaced by the service connection string.
    ///
    /// Default: "REPLACE_WITH_REDIS_URL"
    pub service_url_placeholder: String,

    /// Additional PyInstaller arguments, appended before the entry point.
    ///
    /// Default: Empty
    pub pyinstaller_args: Vec<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            entry_point: PathBuf::from("main.py"),
            naming: ArtifactNaming::default(),
            extension: std::env::consts::EXE_EXTENSION.to_string(),
            version_env: "VERSION".to_string(),
            service_url_env: "REDIS_URL".to_string(),
            version_variable: "VERSION".to_string(),
            service_url_placeholder: "REPLACE_WITH_REDIS_URL".to_string(),
            pyinstaller_args: Vec::new(),
        }
    }
}
