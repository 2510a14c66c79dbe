//! In-memory stage doubles shared by the integration tests.

#![allow(dead_code)]

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use picologs_release::pipeline::{
    Artifact, ArtifactBuilder, ArtifactNaming, ArtifactSigner, BuildEnvironment, BuildSettings,
    EnvironmentProvisioner, Error, EventKind, GitRef, LocalArtifactStore, Pipeline,
    PublishedRelease, Publisher, ReleaseHost, ReleaseRequest, Result, RunContext, RunParams,
    Settings, SettingsBuilder, SignedArtifact, TagStatus, TriggerDecision, TriggerPolicy,
};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Settings rooted in `root`: runs in `root/runs`, uploads in `root/artifacts`.
pub fn settings(root: &Path, naming: ArtifactNaming) -> Settings {
    SettingsBuilder::new()
        .app_name("picologs")
        .work_root(root.join("runs"))
        .trigger(TriggerPolicy::tag_push("v*").unwrap())
        .build_settings(BuildSettings {
            naming,
            extension: "exe".to_string(),
            ..Default::default()
        })
        .build()
        .unwrap()
}

pub fn store(root: &Path) -> LocalArtifactStore {
    LocalArtifactStore::new(root.join("artifacts"))
}

/// Context for an accepted event on `git_ref`.
pub fn context(settings: &Settings, kind: EventKind, git_ref: &str, version: Option<&str>) -> RunContext {
    let decision = TriggerDecision {
        start: true,
        git_ref: GitRef::parse(git_ref),
        reason: "test".to_string(),
    };
    let params = RunParams {
        version: version.map(str::to_string),
        service_url: None,
    };
    RunContext::new(&decision, kind, "0123456789abcdef", params, settings.work_root())
}

pub struct FakeProvisioner {
    pub fail: bool,
}

impl EnvironmentProvisioner for FakeProvisioner {
    async fn provision(&self, ctx: &RunContext) -> Result<BuildEnvironment> {
        if self.fail {
            return Err(Error::EnvironmentSetup("no interpreter".to_string()));
        }
        Ok(BuildEnvironment {
            python: ctx.work_dir.join("venv/bin/python"),
            python_version: "Python 3.11.9".to_string(),
        })
    }
}

/// Writes a small file named by the shared naming function.
pub struct FakeBuilder {
    pub settings: Settings,
    pub fail: bool,
}

impl ArtifactBuilder for FakeBuilder {
    async fn build(&self, ctx: &RunContext, _env: &BuildEnvironment) -> Result<Artifact> {
        if self.fail {
            return Err(Error::Build("pyinstaller exited with 1".to_string()));
        }
        let name = self.settings.artifact_file_name(&ctx.params)?;
        let dist = ctx.dist_dir();
        tokio::fs::create_dir_all(&dist).await?;
        let path = dist.join(name);
        let contents = format!("executable for run {}", ctx.id);
        tokio::fs::write(&path, &contents).await?;
        Ok(Artifact::new(
            ctx.id,
            path,
            contents.len() as u64,
            sha256_hex(contents.as_bytes()),
        ))
    }
}

/// Appends a signature block, or refuses like an invalid credential would.
/// Clones share the call counter.
#[derive(Clone)]
pub struct FakeSigner {
    pub fail: bool,
    calls: Arc<AtomicU32>,
}

impl FakeSigner {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArtifactSigner for FakeSigner {
    async fn sign(&self, _ctx: &RunContext, artifact: Artifact) -> Result<SignedArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Signing("AADSTS7000215: invalid client secret".to_string()));
        }
        let mut bytes = tokio::fs::read(artifact.path()).await?;
        bytes.extend_from_slice(b"\n--signed--");
        tokio::fs::write(artifact.path(), &bytes).await?;
        let sha = sha256_hex(&bytes);
        Ok(artifact.into_signed(bytes.len() as u64, sha))
    }
}

/// What a [`RecordingHost`] was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    Tag { tag: String, sha: String },
    Release { tag: String, title: String, notes: bool, draft: bool, prerelease: bool },
    Asset { release_id: u64, name: String, sha256: String, path: PathBuf },
}

/// Release host that records calls and can fail at a chosen step.
/// Clones share the call log.
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    pub tag_exists: bool,
    pub fail_release: bool,
    pub fail_asset: bool,
    next_id: Arc<AtomicU64>,
}

impl RecordingHost {
    /// Host where the tag is already present.
    pub fn with_existing_tag() -> Self {
        Self {
            tag_exists: true,
            ..Self::default()
        }
    }

    /// Host that rejects release creation.
    pub fn failing_release() -> Self {
        Self {
            fail_release: true,
            ..Self::default()
        }
    }

    /// Host that rejects the asset upload.
    pub fn failing_asset() -> Self {
        Self {
            fail_asset: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn releases(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Release { .. }))
            .collect()
    }

    pub fn assets(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Asset { .. }))
            .collect()
    }
}

impl ReleaseHost for RecordingHost {
    async fn ensure_tag(&self, tag: &str, commit_sha: &str) -> Result<TagStatus> {
        if self.tag_exists {
            return Ok(TagStatus::Existing);
        }
        self.calls.lock().unwrap().push(HostCall::Tag {
            tag: tag.to_string(),
            sha: commit_sha.to_string(),
        });
        Ok(TagStatus::Created)
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<PublishedRelease> {
        if self.fail_release {
            return Err(Error::Publish {
                message: "422 Validation Failed: already_exists".to_string(),
                partial: Vec::new(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(HostCall::Release {
            tag: request.tag_name.clone(),
            title: request.name.clone(),
            notes: request.generate_release_notes,
            draft: request.draft,
            prerelease: request.prerelease,
        });
        Ok(PublishedRelease {
            id,
            html_url: Some(format!("https://example.test/releases/{id}")),
            upload_url: format!("https://uploads.example.test/releases/{id}/assets{{?name,label}}"),
        })
    }

    async fn attach_asset(&self, release: &PublishedRelease, artifact: &SignedArtifact) -> Result<()> {
        if self.fail_asset {
            return Err(Error::Publish {
                message: "asset upload returned 502".to_string(),
                partial: Vec::new(),
            });
        }
        self.calls.lock().unwrap().push(HostCall::Asset {
            release_id: release.id,
            name: artifact.name().to_string(),
            sha256: artifact.sha256().to_string(),
            path: artifact.path().to_path_buf(),
        });
        Ok(())
    }
}

pub type FakePipeline =
    Pipeline<FakeProvisioner, FakeBuilder, FakeSigner, LocalArtifactStore, RecordingHost>;

/// Pipeline with fakes. Pass clones of the signer and host to inspect them afterwards.
pub fn pipeline(
    settings: &Settings,
    root: &Path,
    signer: FakeSigner,
    host: Option<RecordingHost>,
) -> FakePipeline {
    pipeline_with(settings, root, false, false, signer, host)
}

pub fn pipeline_with(
    settings: &Settings,
    root: &Path,
    fail_provision: bool,
    fail_build: bool,
    signer: FakeSigner,
    host: Option<RecordingHost>,
) -> FakePipeline {
    Pipeline::new(
        settings.clone(),
        FakeProvisioner {
            fail: fail_provision,
        },
        FakeBuilder {
            settings: settings.clone(),
            fail: fail_build,
        },
        signer,
        Publisher::new(settings.clone(), store(root), host),
    )
}
