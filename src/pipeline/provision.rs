//! Environment provisioner: an isolated Python environment per run.

use std::future::Future;
use std::path::PathBuf;
use tokio::process::Command;

use super::error::{Error, Result};
use super::process;
use super::run::RunContext;
use super::settings::Settings;
use super::tool_detection;

/// A ready-to-use build environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildEnvironment {
    /// Interpreter inside the isolated environment
    pub python: PathBuf,
    /// Version reported by the base interpreter
    pub python_version: String,
}

/// Establishes the build environment for a run.
pub trait EnvironmentProvisioner {
    fn provision(&self, ctx: &RunContext) -> impl Future<Output = Result<BuildEnvironment>> + Send;
}

/// Provisions a virtual environment with pip.
#[derive(Clone, Debug)]
pub struct PythonProvisioner {
    settings: Settings,
}

impl PythonProvisioner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    async fn pip_install(&self, python: &PathBuf, args: &[String]) -> Result<()> {
        let mut cmd = Command::new(python);
        cmd.args(["-m", "pip", "install", "--disable-pip-version-check"])
            .args(args);
        let output = process::run(&mut cmd, "pip install", self.settings.command_timeout()).await?;
        if !output.status.success() {
            return Err(Error::EnvironmentSetup(output.failure("pip install")));
        }
        Ok(())
    }
}

impl EnvironmentProvisioner for PythonProvisioner {
    async fn provision(&self, ctx: &RunContext) -> Result<BuildEnvironment> {
        let env = self.settings.environment();

        let (base, python_version) = tool_detection::find_python(&env.python)
            .await
            .ok_or_else(|| {
                Error::EnvironmentSetup(format!(
                    "no Python {} interpreter found in PATH",
                    env.python
                ))
            })?;

        let venv = ctx.work_dir.join("venv");
        log::info!("Creating virtual environment at {}", venv.display());
        let mut cmd = Command::new(&base);
        cmd.args(["-m", "venv"]).arg(&venv);
        let output = process::run(&mut cmd, "python -m venv", self.settings.command_timeout()).await?;
        if !output.status.success() {
            return Err(Error::EnvironmentSetup(output.failure("python -m venv")));
        }

        let python = if cfg!(windows) {
            venv.join("Scripts").join("python.exe")
        } else {
            venv.join("bin").join("python")
        };

        if let Some(requirements) = &env.requirements {
            if !requirements.is_file() {
                return Err(Error::EnvironmentSetup(format!(
                    "requirements file not found: {}",
                    requirements.display()
                )));
            }
            log::info!("Installing {}", requirements.display());
            self.pip_install(
                &python,
                &["-r".to_string(), requirements.display().to_string()],
            )
            .await?;
        }

        if !env.packages.is_empty() {
            log::info!("Installing {}", env.packages.join(", "));
            self.pip_install(&python, &env.packages).await?;
        }

        Ok(BuildEnvironment {
            python,
            python_version,
        })
    }
}
