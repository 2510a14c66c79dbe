//! PyInstaller-backed builder.

use std::path::Path;
use tokio::process::Command;

use super::ArtifactBuilder;
use super::checksum::calculate_sha256;
use super::stamp::stamp_source;
use crate::pipeline::error::{Error, ErrorExt, Result};
use crate::pipeline::naming;
use crate::pipeline::process;
use crate::pipeline::provision::BuildEnvironment;
use crate::pipeline::run::{Artifact, RunContext};
use crate::pipeline::settings::Settings;
use crate::pipeline::utils::fs;

/// Packages the entry point into a single-file executable.
#[derive(Clone, Debug)]
pub struct PyInstallerBuilder {
    settings: Settings,
}

impl PyInstallerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Arguments passed to `python -m PyInstaller`.
    pub fn pyinstaller_args(&self, ctx: &RunContext, stem: &str, staged_entry: &Path) -> Vec<String> {
        let build = self.settings.build();
        let source_dir = build
            .entry_point
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut args = vec![
            "-m".to_string(),
            "PyInstaller".to_string(),
            "--onefile".to_string(),
            "--clean".to_string(),
            "--noconfirm".to_string(),
            "--name".to_string(),
            stem.to_string(),
            "--distpath".to_string(),
            ctx.dist_dir().display().to_string(),
            "--workpath".to_string(),
            ctx.work_dir.join("build").display().to_string(),
            "--specpath".to_string(),
            ctx.work_dir.join("spec").display().to_string(),
            // The staged entry point lives outside the source tree
            "--paths".to_string(),
            source_dir.display().to_string(),
        ];
        args.extend(build.pyinstaller_args.iter().cloned());
        args.push(staged_entry.display().to_string());
        args
    }

    /// Writes the stamped entry point into the run directory.
    async fn stage_entry_point(&self, ctx: &RunContext) -> Result<std::path::PathBuf> {
        let build = self.settings.build();
        let entry = &build.entry_point;

        let source = tokio::fs::read_to_string(entry)
            .await
            .fs_context("reading entry point", entry)?;
        let stamped = stamp_source(&source, build, &ctx.params)?;
        log::debug!(
            "Stamped entry point (version: {}, service url: {})",
            stamped.version_stamped,
            stamped.service_url_stamped
        );

        let file_name = entry
            .file_name()
            .ok_or_else(|| Error::Build(format!("invalid entry point: {}", entry.display())))?;
        let staged = ctx.work_dir.join("src").join(file_name);
        fs::write_file(&staged, stamped.source).await?;
        Ok(staged)
    }
}

impl ArtifactBuilder for PyInstallerBuilder {
    async fn build(&self, ctx: &RunContext, env: &BuildEnvironment) -> Result<Artifact> {
        let build = self.settings.build();
        let stem = naming::artifact_stem(self.settings.app_name(), build.naming, &ctx.params)?;
        let file_name = self.settings.artifact_file_name(&ctx.params)?;

        let staged = self.stage_entry_point(ctx).await?;
        fs::create_dir_all(&ctx.dist_dir(), true).await?;

        log::info!("Packaging {} as {file_name}", build.entry_point.display());
        let mut cmd = Command::new(&env.python);
        cmd.args(self.pyinstaller_args(ctx, &stem, &staged));
        let output = process::run(&mut cmd, "pyinstaller", self.settings.command_timeout()).await?;
        if !output.status.success() {
            return Err(Error::Build(output.failure("pyinstaller")));
        }

        // PyInstaller appends the host executable suffix; rename when the
        // configured extension differs.
        let produced = ctx
            .dist_dir()
            .join(format!("{stem}{}", std::env::consts::EXE_SUFFIX));
        let expected = ctx.dist_dir().join(&file_name);
        if produced != expected && produced.is_file() {
            tokio::fs::rename(&produced, &expected)
                .await
                .fs_context("renaming artifact to", &expected)?;
        }

        if !expected.is_file() {
            return Err(Error::Build(format!(
                "pyinstaller finished but no artifact exists at {}",
                expected.display()
            )));
        }

        let (sha256, size) = calculate_sha256(&expected).await?;
        log::info!("✓ Built {file_name} ({size} bytes, sha256 {sha256})");
        Ok(Artifact::new(ctx.id, expected, size, sha256))
    }
}
