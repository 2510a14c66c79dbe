//! Core Settings struct and implementations.

use super::{BuildSettings, EnvironmentSettings, PublishSettings, SigningSettings};
use crate::pipeline::error::Result;
use crate::pipeline::naming;
use crate::pipeline::run::RunParams;
use crate::pipeline::trigger::TriggerPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deployment configuration for the release pipeline.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder), usually from
/// `release.toml`. One `Settings` value describes one deployment: a single
/// trigger policy, a single naming convention and a single signing setup.
///
/// # Examples
///
/// ```no_run
/// use picologs_release::pipeline::{SettingsBuilder, TriggerPolicy};
///
/// # fn example() -> picologs_release::pipeline::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_name("picologs")
///     .work_root("target/release-runs")
///     .trigger(TriggerPolicy::tag_push("v*")?)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Base name of the produced executable.
    app_name: String,

    /// Directory holding one subdirectory per run.
    work_root: PathBuf,

    /// Which events start a run.
    trigger: TriggerPolicy,

    /// Whether manual dispatch starts a run under push policies.
    allow_manual_dispatch: bool,

    environment: EnvironmentSettings,
    build: BuildSettings,
    signing: SigningSettings,
    publish: PublishSettings,

    /// Upper bound for any single external command.
    ///
    /// None leaves commands unbounded.
    command_timeout: Option<Duration>,
}

impl Settings {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        app_name: String,
        work_root: PathBuf,
        trigger: TriggerPolicy,
        allow_manual_dispatch: bool,
        environment: EnvironmentSettings,
        build: BuildSettings,
        signing: SigningSettings,
        publish: PublishSettings,
        command_timeout: Option<Duration>,
    ) -> Self {
        Self {
            app_name,
            work_root,
            trigger,
            allow_manual_dispatch,
            environment,
            build,
            signing,
            publish,
            command_timeout,
        }
    }

    /// Returns the application name.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the root of the per-run work directories.
    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Returns the trigger policy.
    pub fn trigger(&self) -> &TriggerPolicy {
        &self.trigger
    }

    pub fn allow_manual_dispatch(&self) -> bool {
        self.allow_manual_dispatch
    }

    pub fn environment(&self) -> &EnvironmentSettings {
        &self.environment
    }

    pub fn build(&self) -> &BuildSettings {
        &self.build
    }

    pub fn signing(&self) -> &SigningSettings {
        &self.signing
    }

    pub fn publish(&self) -> &PublishSettings {
        &self.publish
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    /// Deterministic artifact file name for the given parameters.
    ///
    /// The builder, signer and publisher all go through this, so they always
    /// agree on where the executable is.
    pub fn artifact_file_name(&self, params: &RunParams) -> Result<String> {
        naming::artifact_file_name(
            &self.app_name,
            self.build.naming,
            &self.build.extension,
            params,
        )
    }
}
