//! Publisher settings.

use serde::Deserialize;
use std::path::PathBuf;

/// Artifact upload and release configuration.
///
/// # Configuration
///
/// ```toml
/// [publish]
/// repository = "space-man-rob-productions/sc-command-app"
/// store_dir = "artifacts"
/// release_title = "{{app}} {{tag}}"
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishSettings {
    /// `owner/name` of the repository receiving tags and releases.
    ///
    /// Required for tag-triggered runs.
    ///
    /// Default: None
    pub repository: Option<String>,

    /// Base URL of the GitHub REST API.
    ///
    /// Default: "https://api.github.com"
    pub api_url: String,

    /// Environment variable holding the API token.
    ///
    /// Default: "GITHUB_TOKEN"
    pub token_env: String,

    /// Root of the artifact store; uploads land in `<store_dir>/<run id>/`.
    ///
    /// Default: "artifacts"
    pub store_dir: PathBuf,

    /// Handlebars template for the release title. Variables: `app`, `tag`,
    /// `version`, `artifact`.
    ///
    /// Default: "{{app}} {{tag}}"
    pub release_title: String,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            repository: None,
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            store_dir: PathBuf::from("artifacts"),
            release_title: "{{app}} {{tag}}".to_string(),
        }
    }
}
