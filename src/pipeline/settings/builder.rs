//! Builder for constructing Settings.

use super::{BuildSettings, EnvironmentSettings, PublishSettings, Settings, SigningSettings};
use crate::pipeline::trigger::TriggerPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use picologs_release::pipeline::{BuildSettings, SettingsBuilder, TriggerPolicy};
///
/// # fn example() -> picologs_release::pipeline::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_name("sc-command")
///     .work_root("target/release-runs")
///     .trigger(TriggerPolicy::BranchPush { branches: vec!["main".into()] })
///     .build_settings(BuildSettings {
///         entry_point: "sc_command.py".into(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SettingsBuilder {
    app_name: Option<String>,
    work_root: Option<PathBuf>,
    trigger: TriggerPolicy,
    allow_manual_dispatch: bool,
    environment: EnvironmentSettings,
    build: BuildSettings,
    signing: SigningSettings,
    publish: PublishSettings,
    command_timeout: Option<Duration>,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self {
            app_name: None,
            work_root: None,
            trigger: TriggerPolicy::ManualDispatch,
            allow_manual_dispatch: true,
            environment: EnvironmentSettings::default(),
            build: BuildSettings::default(),
            signing: SigningSettings::default(),
            publish: PublishSettings::default(),
            command_timeout: None,
        }
    }
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application name used for artifact naming.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets the directory under which each run gets its own work directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn work_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.work_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the trigger policy.
    ///
    /// Default: [`TriggerPolicy::ManualDispatch`]
    pub fn trigger(mut self, policy: TriggerPolicy) -> Self {
        self.trigger = policy;
        self
    }

    /// Default: true
    pub fn allow_manual_dispatch(mut self, allow: bool) -> Self {
        self.allow_manual_dispatch = allow;
        self
    }

    pub fn environment_settings(mut self, settings: EnvironmentSettings) -> Self {
        self.environment = settings;
        self
    }

    pub fn build_settings(mut self, settings: BuildSettings) -> Self {
        self.build = settings;
        self
    }

    pub fn signing_settings(mut self, settings: SigningSettings) -> Self {
        self.signing = settings;
        self
    }

    pub fn publish_settings(mut self, settings: PublishSettings) -> Self {
        self.publish = settings;
        self
    }

    /// Bounds every external command.
    ///
    /// Default: None (unbounded)
    pub fn command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing:
    /// - `app_name`
    /// - `work_root`
    pub fn build(self) -> crate::pipeline::Result<Settings> {
        use crate::pipeline::error::Context;

        let app_name = self
            .app_name
            .filter(|n| !n.trim().is_empty())
            .context("app_name is required")?;

        Ok(Settings::new(
            app_name,
            self.work_root.context("work_root is required")?,
            self.trigger,
            self.allow_manual_dispatch,
            self.environment,
            self.build,
            self.signing,
            self.publish,
            self.command_timeout,
        ))
    }
}
