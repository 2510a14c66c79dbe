//! `run`: gate the event and execute the full pipeline.

use crate::cli::{EventArgs, ParamArgs, RuntimeConfig};
use crate::error::{CliError, ReleaseError, Result};
use crate::pipeline::{
    GitHubReleases, LocalArtifactStore, Pipeline, Publisher, PyInstallerBuilder,
    PythonProvisioner, REPORT_FILE, RunContext, RunReport, Settings, SigningCredentials,
    TrustedSigner, trigger,
};

pub async fn execute(
    settings: Settings,
    event_args: &EventArgs,
    param_args: &ParamArgs,
    sha: Option<String>,
    runtime: &RuntimeConfig,
) -> Result<i32> {
    let event = super::trigger_event(event_args)?;
    let decision = trigger::evaluate(settings.trigger(), settings.allow_manual_dispatch(), &event);
    if !decision.start {
        runtime.warn(&format!("{} skipped: {}", decision.git_ref, decision.reason))?;
        return Ok(0);
    }
    runtime.progress(&format!("{}: {}", decision.git_ref, decision.reason))?;

    let commit_sha = match sha.filter(|s| !s.is_empty()) {
        Some(sha) => sha,
        None => head_commit().await?,
    };
    let params = super::run_params(param_args, &settings);
    let ctx = RunContext::new(&decision, event.kind, commit_sha, params, settings.work_root());
    runtime.verbose_println(&format!("Run {} in {}", ctx.id, ctx.work_dir.display()))?;

    let host = release_host(&settings)?;
    if host.is_none() && ctx.is_tag_triggered() {
        runtime.warn("no release host configured; set publish.repository and the API token")?;
    }

    let credentials = SigningCredentials::from_env(&settings.signing().credentials);
    let publisher = Publisher::new(
        settings.clone(),
        LocalArtifactStore::new(settings.publish().store_dir.clone()),
        host,
    );
    let pipeline = Pipeline::new(
        settings.clone(),
        PythonProvisioner::new(settings.clone()),
        PyInstallerBuilder::new(settings.clone()),
        TrustedSigner::new(settings.clone(), credentials),
        publisher,
    );

    match pipeline.run(&ctx).await {
        Ok(report) => {
            print_summary(runtime, &report)?;
            runtime.verbose_println(&format!(
                "Report: {}",
                ctx.work_dir.join(REPORT_FILE).display()
            ))?;
            Ok(0)
        }
        Err(e) => {
            runtime.error(&format!(
                "Run {} failed; report at {}",
                ctx.id,
                ctx.work_dir.join(REPORT_FILE).display()
            ))?;
            Err(ReleaseError::Pipeline(e))
        }
    }
}

/// GitHub client when both a repository and a token are configured.
fn release_host(settings: &Settings) -> Result<Option<GitHubReleases>> {
    let publish = settings.publish();
    let Some(repository) = &publish.repository else {
        return Ok(None);
    };
    let token = match std::env::var(&publish.token_env) {
        Ok(token) if !token.is_empty() => token,
        _ => {
            log::debug!("{} is not set; releases disabled", publish.token_env);
            return Ok(None);
        }
    };
    Ok(Some(GitHubReleases::new(&publish.api_url, repository, &token)?))
}

/// `git rev-parse HEAD` in the current directory.
async fn head_commit() -> Result<String> {
    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .await
        .map_err(|e| {
            ReleaseError::Cli(CliError::ExecutionFailed {
                command: "git rev-parse HEAD".to_string(),
                reason: e.to_string(),
            })
        })?;

    if !output.status.success() {
        return Err(ReleaseError::Cli(CliError::ExecutionFailed {
            command: "git rev-parse HEAD".to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn print_summary(runtime: &RuntimeConfig, report: &RunReport) -> Result<()> {
    runtime.section(&format!("Run {}", report.run_id))?;
    if let Some(artifact) = &report.artifact {
        runtime.success(&format!("Signed {}", artifact.name()))?;
        runtime.indent(&format!("sha256 {}", artifact.sha256()))?;
    }
    if let Some(upload) = &report.publication.upload {
        runtime.success(&format!("Uploaded to {}", upload.location))?;
    }
    match &report.publication.release {
        Some(release) => {
            runtime.success(&format!("Released {} ({})", release.tag, release.title))?;
            if let Some(url) = &release.html_url {
                runtime.indent(url)?;
            }
        }
        None => runtime.verbose_println("No release (not a tag run)")?,
    }
    Ok(())
}
