//! Publisher stage: artifact upload and, for tag runs, release creation.
//!
//! Upload always happens first. Release creation is not atomic with it and
//! has no rollback: if a later step fails, whatever was already created stays
//! and is listed in the `partial` field of [`Error::Publish`](crate::pipeline::Error::Publish).

mod github;
mod store;

use handlebars::Handlebars;

use super::error::{Error, Result, Stage};
use super::run::{Publication, Release, RunContext, SignedArtifact};
use super::settings::Settings;

pub use github::{
    GitHubReleases, PublishedRelease, ReleaseHost, ReleaseRequest, TagStatus, asset_upload_url,
};
pub use store::{ArtifactStore, LocalArtifactStore};

/// Runs both publisher sub-operations against a store and an optional host.
///
/// A host is only needed for tag-triggered runs.
#[derive(Debug)]
pub struct Publisher<A, H> {
    settings: Settings,
    store: A,
    host: Option<H>,
}

impl<A: ArtifactStore, H: ReleaseHost> Publisher<A, H> {
    pub fn new(settings: Settings, store: A, host: Option<H>) -> Self {
        Self {
            settings,
            store,
            host,
        }
    }

    /// True when release creation is possible.
    pub fn has_release_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    /// Renders the release title for `tag`.
    pub fn release_title(&self, ctx: &RunContext, tag: &str, artifact: &SignedArtifact) -> Result<String> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        let data = serde_json::json!({
            "app": self.settings.app_name(),
            "tag": tag,
            "version": ctx.params.version,
            "artifact": artifact.name(),
        });
        Ok(registry.render_template(&self.settings.publish().release_title, &data)?)
    }

    /// Uploads `artifact` and, on tag runs, releases it.
    pub async fn publish(&self, ctx: &RunContext, artifact: &SignedArtifact) -> Result<Publication> {
        if artifact.run_id() != ctx.id {
            return Err(Error::Publish {
                message: format!(
                    "artifact {} belongs to run {}, not run {}",
                    artifact.name(),
                    artifact.run_id(),
                    ctx.id
                ),
                partial: Vec::new(),
            });
        }

        let upload = self
            .store
            .upload(ctx, artifact)
            .await
            .map_err(|e| e.in_stage(Stage::Publish))?;

        let Some(tag) = ctx.git_ref.tag() else {
            log::info!("{} is not a tag; skipping release", ctx.git_ref);
            return Ok(Publication {
                upload: Some(upload),
                release: None,
            });
        };

        let host = self.host.as_ref().ok_or_else(|| Error::Publish {
            message: "tag run has no release host configured".to_string(),
            partial: vec![format!("uploaded artifact {}", upload.location)],
        })?;

        let mut created = vec![format!("uploaded artifact {}", upload.location)];
        let release = self
            .release(ctx, host, tag, artifact, &mut created)
            .await
            .map_err(|e| leave_partial(e, &created))?;

        Ok(Publication {
            upload: Some(upload),
            release: Some(release),
        })
    }

    async fn release(
        &self,
        ctx: &RunContext,
        host: &H,
        tag: &str,
        artifact: &SignedArtifact,
        created: &mut Vec<String>,
    ) -> Result<Release> {
        if host.ensure_tag(tag, &ctx.commit_sha).await? == TagStatus::Created {
            created.push(format!("tag {tag}"));
        }

        let title = self.release_title(ctx, tag, artifact)?;
        let published = host.create_release(&ReleaseRequest::new(tag, &title)).await?;
        created.push(format!("release {} ({tag})", published.id));

        host.attach_asset(&published, artifact).await?;

        Ok(Release {
            run_id: ctx.id,
            id: published.id,
            tag: tag.to_string(),
            title,
            html_url: published.html_url,
            asset_name: artifact.name().to_string(),
        })
    }
}

/// Attaches the already-created state to a publish failure.
fn leave_partial(error: Error, created: &[String]) -> Error {
    let message = match error {
        Error::Publish { message, .. } => message,
        other => other.to_string(),
    };
    log::warn!(
        "Publishing failed after: {}. This state is left in place.",
        created.join(", ")
    );
    Error::Publish {
        message,
        partial: created.to_vec(),
    }
}
