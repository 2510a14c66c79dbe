//! Pipeline configuration from a single `release.toml`

use crate::error::{CliError, ReleaseError, Result};
use crate::pipeline::{
    BuildSettings, EnvironmentSettings, PublishSettings, Settings, SettingsBuilder,
    SigningSettings, TriggerPolicy,
};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Raw file layout. Every table except `[app]` is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    app: AppSection,
    #[serde(default)]
    trigger: TriggerSection,
    #[serde(default)]
    environment: EnvironmentSettings,
    #[serde(default)]
    build: BuildSettings,
    #[serde(default)]
    signing: SigningSettings,
    #[serde(default)]
    publish: PublishSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AppSection {
    name: String,
    #[serde(default = "default_work_root")]
    work_root: PathBuf,
    /// Kill external tools running longer than this
    #[serde(default)]
    timeout_secs: Option<u64>,
}

fn default_work_root() -> PathBuf {
    PathBuf::from("target/release-runs")
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PolicyKind {
    BranchPush,
    #[default]
    TagPush,
    ManualDispatch,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TriggerSection {
    policy: PolicyKind,
    branches: Vec<String>,
    tag_pattern: String,
    allow_manual_dispatch: bool,
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            policy: PolicyKind::TagPush,
            branches: vec!["main".to_string()],
            tag_pattern: "v*".to_string(),
            allow_manual_dispatch: true,
        }
    }
}

impl TriggerSection {
    fn policy(&self) -> Result<TriggerPolicy> {
        match self.policy {
            PolicyKind::BranchPush => {
                if self.branches.is_empty() {
                    return Err(invalid("trigger.branches must list at least one branch"));
                }
                Ok(TriggerPolicy::BranchPush {
                    branches: self.branches.clone(),
                })
            }
            PolicyKind::TagPush => Ok(TriggerPolicy::tag_push(&self.tag_pattern)?),
            PolicyKind::ManualDispatch => Ok(TriggerPolicy::ManualDispatch),
        }
    }
}

fn invalid(reason: impl Into<String>) -> ReleaseError {
    ReleaseError::Cli(CliError::InvalidArguments {
        reason: reason.into(),
    })
}

/// Load pipeline settings from `config_path` (single read + parse).
///
/// Relative paths in the file (work root, requirements, entry point, signing
/// library, store directory) are resolved against the directory containing
/// the file, so the pipeline behaves the same from any working directory.
pub fn load_config(config_path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(config_path).map_err(|e| {
        ReleaseError::Cli(CliError::ExecutionFailed {
            command: "read_config".to_string(),
            reason: format!("Failed to read {}: {}", config_path.display(), e),
        })
    })?;

    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let base = base.absolutize()?.into_owned();

    parse_config(&text, &base)
}

/// Parse configuration text, resolving relative paths against `base`.
pub fn parse_config(text: &str, base: &Path) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(text)?;

    let policy = file.trigger.policy()?;

    let mut environment = file.environment;
    environment.requirements = environment
        .requirements
        .map(|p| resolve(base, &p))
        .transpose()?;

    let mut build = file.build;
    build.entry_point = resolve(base, &build.entry_point)?;

    let mut signing = file.signing;
    signing.dlib = signing.dlib.map(|p| resolve(base, &p)).transpose()?;
    // Bare tool names are looked up on PATH; only explicit paths are resolved
    if signing.tool.components().count() > 1 {
        signing.tool = resolve(base, &signing.tool)?;
    }
    glob::Pattern::new(&signing.files)
        .map_err(|e| invalid(format!("signing.files is not a valid pattern: {e}")))?;

    let mut publish = file.publish;
    publish.store_dir = resolve(base, &publish.store_dir)?;
    if let Some(repository) = &publish.repository {
        if repository.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(invalid(format!(
                "publish.repository must be owner/name, got {repository:?}"
            )));
        }
    }

    let settings = SettingsBuilder::new()
        .app_name(file.app.name)
        .work_root(resolve(base, &file.app.work_root)?)
        .trigger(policy)
        .allow_manual_dispatch(file.trigger.allow_manual_dispatch)
        .environment_settings(environment)
        .build_settings(build)
        .signing_settings(signing)
        .publish_settings(publish)
        .command_timeout(file.app.timeout_secs.map(Duration::from_secs))
        .build()?;

    log::debug!("Loaded configuration for {}", settings.app_name());
    Ok(settings)
}

fn resolve(base: &Path, path: &Path) -> Result<PathBuf> {
    Ok(path.absolutize_from(base)?.into_owned())
}
