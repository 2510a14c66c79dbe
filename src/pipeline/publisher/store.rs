//! Run-scoped artifact storage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::pipeline::builder::checksum::calculate_sha256;
use crate::pipeline::error::{Error, Result};
use crate::pipeline::run::{RunContext, RunId, SignedArtifact, UploadedArtifact};
use crate::pipeline::trigger::GitRef;
use crate::pipeline::utils::fs;

/// Stores a signed artifact under a run-scoped name for later retrieval.
pub trait ArtifactStore {
    fn upload(
        &self,
        ctx: &RunContext,
        artifact: &SignedArtifact,
    ) -> impl Future<Output = Result<UploadedArtifact>> + Send;
}

/// Manifest written next to every stored artifact.
#[derive(Debug, Serialize)]
struct StoreManifest<'a> {
    run_id: RunId,
    name: &'a str,
    size: u64,
    sha256: &'a str,
    git_ref: &'a GitRef,
    commit_sha: &'a str,
    uploaded_at: DateTime<Utc>,
}

/// Directory-backed store: `<root>/<run id>/<artifact>` plus `manifest.json`.
#[derive(Clone, Debug)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the uploads of one run.
    pub fn run_dir(&self, run_id: RunId) -> PathBuf {
        self.root.join(run_id.to_string())
    }
}

impl ArtifactStore for LocalArtifactStore {
    async fn upload(&self, ctx: &RunContext, artifact: &SignedArtifact) -> Result<UploadedArtifact> {
        let dir = self.run_dir(ctx.id);
        let dest = dir.join(artifact.name());
        if dest.exists() {
            return Err(Error::Publish {
                message: format!("{} was already uploaded for run {}", artifact.name(), ctx.id),
                partial: Vec::new(),
            });
        }

        fs::copy_file(artifact.path(), &dest).await?;
        let (sha256, _) = calculate_sha256(&dest).await?;
        if sha256 != artifact.sha256() {
            return Err(Error::Publish {
                message: format!(
                    "checksum mismatch after upload of {}: expected {}, stored {sha256}",
                    artifact.name(),
                    artifact.sha256()
                ),
                partial: vec![format!("stored file {}", dest.display())],
            });
        }

        let manifest = StoreManifest {
            run_id: ctx.id,
            name: artifact.name(),
            size: artifact.size(),
            sha256: artifact.sha256(),
            git_ref: &ctx.git_ref,
            commit_sha: &ctx.commit_sha,
            uploaded_at: Utc::now(),
        };
        fs::write_file(&dir.join("manifest.json"), serde_json::to_vec_pretty(&manifest)?).await?;

        log::info!("✓ Uploaded {} to {}", artifact.name(), dest.display());
        Ok(UploadedArtifact {
            run_id: ctx.id,
            name: artifact.name().to_string(),
            location: dest.display().to_string(),
            sha256,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run::{Artifact, RunParams};
    use crate::pipeline::trigger::{EventKind, TriggerDecision};

    fn context(root: &Path) -> RunContext {
        let decision = TriggerDecision {
            start: true,
            git_ref: GitRef::Tag("v1.2.3".into()),
            reason: String::new(),
        };
        RunContext::new(&decision, EventKind::Push, "abc", RunParams::default(), root)
    }

    async fn signed(ctx: &RunContext, contents: &[u8], claimed_sha: Option<&str>) -> SignedArtifact {
        let path = ctx.dist_dir().join("picologs-1.2.3.exe");
        fs::write_file(&path, contents).await.unwrap();
        let (sha256, size) = calculate_sha256(&path).await.unwrap();
        let sha256 = claimed_sha.map(str::to_string).unwrap_or(sha256);
        Artifact::new(ctx.id, path, size, sha256.clone()).into_signed(size, sha256)
    }

    #[tokio::test]
    async fn stores_under_the_run_id_with_a_manifest() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(&temp.path().join("runs"));
        let artifact = signed(&ctx, b"signed exe", None).await;
        let store = LocalArtifactStore::new(temp.path().join("artifacts"));

        let uploaded = store.upload(&ctx, &artifact).await.unwrap();

        let dest = store.run_dir(ctx.id).join("picologs-1.2.3.exe");
        assert_eq!(uploaded.location, dest.display().to_string());
        assert_eq!(uploaded.sha256, artifact.sha256());
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"signed exe");
        let manifest = tokio::fs::read_to_string(store.run_dir(ctx.id).join("manifest.json"))
            .await
            .unwrap();
        assert!(manifest.contains(&ctx.id.to_string()));
    }

    #[tokio::test]
    async fn second_upload_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(&temp.path().join("runs"));
        let artifact = signed(&ctx, b"signed exe", None).await;
        let store = LocalArtifactStore::new(temp.path().join("artifacts"));

        store.upload(&ctx, &artifact).await.unwrap();
        let err = store.upload(&ctx, &artifact).await.unwrap_err();

        assert!(matches!(err, Error::Publish { .. }));
        assert!(err.to_string().contains("already uploaded"));
    }

    #[tokio::test]
    async fn checksum_mismatch_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(&temp.path().join("runs"));
        let claimed = "0".repeat(64);
        let artifact = signed(&ctx, b"tampered after signing", Some(&claimed)).await;
        let store = LocalArtifactStore::new(temp.path().join("artifacts"));

        let err = store.upload(&ctx, &artifact).await.unwrap_err();

        match err {
            Error::Publish { message, partial } => {
                assert!(message.contains("checksum mismatch"));
                assert_eq!(partial.len(), 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
