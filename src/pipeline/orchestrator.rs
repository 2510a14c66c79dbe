//! Main pipeline orchestration.
//!
//! This module provides the [`Pipeline`] that drives one run through the
//! stages in order, stopping at the first failure.

use chrono::Utc;
use std::future::Future;

use super::builder::ArtifactBuilder;
use super::error::{Error, Result, Stage};
use super::provision::EnvironmentProvisioner;
use super::publisher::{ArtifactStore, Publisher, ReleaseHost};
use super::run::{RunContext, RunReport};
use super::settings::Settings;
use super::signer::ArtifactSigner;
use super::utils::fs;

/// Name of the report written into every run directory.
pub const REPORT_FILE: &str = "run.json";

/// Release pipeline orchestrator.
///
/// Runs provision → build → sign → publish. Every stage is fail-fast and
/// nothing is retried; a signed artifact exists only if build and sign both
/// succeeded, and publishing only ever sees that artifact.
///
/// # Examples
///
/// ```no_run
/// use picologs_release::pipeline::{
///     GitHubReleases, LocalArtifactStore, Pipeline, Publisher, PyInstallerBuilder,
///     PythonProvisioner, RunContext, Settings, SigningCredentials, TrustedSigner,
/// };
///
/// # async fn example(settings: Settings, ctx: RunContext) -> picologs_release::pipeline::Result<()> {
/// let publisher = Publisher::new(
///     settings.clone(),
///     LocalArtifactStore::new("artifacts"),
///     None::<GitHubReleases>,
/// );
/// let pipeline = Pipeline::new(
///     settings.clone(),
///     PythonProvisioner::new(settings.clone()),
///     PyInstallerBuilder::new(settings.clone()),
///     TrustedSigner::new(settings.clone(), SigningCredentials::default()),
///     publisher,
/// );
/// let report = pipeline.run(&ctx).await?;
/// println!("{:?}", report.outcome);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<P, B, S, A, H> {
    settings: Settings,
    provisioner: P,
    builder: B,
    signer: S,
    publisher: Publisher<A, H>,
}

impl<P, B, S, A, H> std::fmt::Debug for Pipeline<P, B, S, A, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<P, B, S, A, H> Pipeline<P, B, S, A, H>
where
    P: EnvironmentProvisioner,
    B: ArtifactBuilder,
    S: ArtifactSigner,
    A: ArtifactStore,
    H: ReleaseHost,
{
    pub fn new(
        settings: Settings,
        provisioner: P,
        builder: B,
        signer: S,
        publisher: Publisher<A, H>,
    ) -> Self {
        Self {
            settings,
            provisioner,
            builder,
            signer,
            publisher,
        }
    }

    /// Returns a reference to the pipeline settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn publisher(&self) -> &Publisher<A, H> {
        &self.publisher
    }

    /// Executes one run.
    ///
    /// The report is written to `<run dir>/run.json` whether the run
    /// succeeds or not; on failure the error is returned after that.
    pub async fn run(&self, ctx: &RunContext) -> Result<RunReport> {
        log::info!(
            "Run {} for {} at {} started",
            ctx.id,
            ctx.git_ref,
            ctx.commit_sha
        );

        let mut report = RunReport::new(ctx);
        let result = self.execute(ctx, &mut report).await;
        report.finish(result.as_ref().err());

        if let Err(e) = write_report(ctx, &report).await {
            log::warn!("Could not write run report: {e}");
        }

        match result {
            Ok(()) => {
                log::info!("Run {} succeeded", ctx.id);
                Ok(report)
            }
            Err(e) => {
                log::error!("Run {} failed: {e}", ctx.id);
                Err(e)
            }
        }
    }

    async fn execute(&self, ctx: &RunContext, report: &mut RunReport) -> Result<()> {
        // Refuse up front rather than after signing
        if ctx.is_tag_triggered() && !self.publisher.has_release_host() {
            return Err(Error::Publish {
                message: format!(
                    "{} is a tag run but no release host is configured (set publish.repository and the API token)",
                    ctx.git_ref
                ),
                partial: Vec::new(),
            });
        }

        fs::create_dir_all(&ctx.work_dir, false)
            .await
            .map_err(|e| e.in_stage(Stage::Provision))?;

        let env = stage(report, Stage::Provision, self.provisioner.provision(ctx)).await?;

        let artifact = stage(report, Stage::Build, self.builder.build(ctx, &env)).await?;
        if artifact.run_id() != ctx.id {
            return Err(Error::Build(format!(
                "builder returned an artifact of run {}",
                artifact.run_id()
            )));
        }

        let signed = stage(report, Stage::Sign, self.signer.sign(ctx, artifact)).await?;
        report.artifact = Some(signed.clone());

        let publication = stage(report, Stage::Publish, self.publisher.publish(ctx, &signed)).await?;
        report.publication = publication;

        Ok(())
    }
}

/// Awaits one stage, classifying its error and recording the outcome.
async fn stage<T>(
    report: &mut RunReport,
    stage: Stage,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    let started_at = Utc::now();
    log::info!("▶ {stage}");
    match work.await.map_err(|e| e.in_stage(stage)) {
        Ok(value) => {
            report.record(stage, started_at, None);
            Ok(value)
        }
        Err(e) => {
            report.record(stage, started_at, Some(&e));
            Err(e)
        }
    }
}

async fn write_report(ctx: &RunContext, report: &RunReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    fs::write_file(&ctx.work_dir.join(REPORT_FILE), json).await
}
