//! Build environment provisioning settings.

use serde::Deserialize;
use std::path::PathBuf;

/// Python environment configuration.
///
/// # Configuration
///
/// ```toml
/// [environment]
/// python = "3.11"
/// requirements = "requirements.txt"
/// packages = ["pyinstaller"]
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentSettings {
    /// Interpreter version prefix, matched against `python --version`.
    ///
    /// Default: "3.11"
    pub python: String,

    /// Requirements file installed with `pip install -r`.
    ///
    /// Relative paths resolve against the config file directory.
    ///
    /// Default: Some("requirements.txt")
    pub requirements: Option<PathBuf>,

    /// Extra packages installed after the requirements.
    ///
    /// Default: `["pyinstaller"]`
    pub packages: Vec<String>,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            python: "3.11".to_string(),
            requirements: Some(PathBuf::from("requirements.txt")),
            packages: vec!["pyinstaller".to_string()],
        }
    }
}
