//! Run-scoped data: the run context, artifacts, releases and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{Error, Stage};
use super::trigger::{EventKind, GitRef, TriggerDecision};

/// Identifier of one pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Build-time parameters injected from the environment.
///
/// Both values are opaque: they are passed through to the build untouched.
/// The service URL carries credentials, so reports only record whether it was set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub version: Option<String>,
    #[serde(serialize_with = "redact")]
    pub service_url: Option<String>,
}

fn redact<S: serde::Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_str("<set>"),
        None => serializer.serialize_none(),
    }
}

/// Everything a stage needs to know about the current run.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub id: RunId,
    pub event: EventKind,
    pub git_ref: GitRef,
    pub commit_sha: String,
    pub params: RunParams,
    pub started_at: DateTime<Utc>,
    /// `<work_root>/<run id>`; nothing outside it is written by build or sign
    pub work_dir: PathBuf,
}

impl RunContext {
    /// Creates the context for a run the gate has accepted.
    ///
    /// On tag runs without an explicit version, the version defaults to the
    /// tag name with a leading `v` removed.
    pub fn new(
        decision: &TriggerDecision,
        event: EventKind,
        commit_sha: impl Into<String>,
        mut params: RunParams,
        work_root: &Path,
    ) -> Self {
        if params.version.is_none() {
            params.version = decision.git_ref.tag_version().map(str::to_string);
        }

        let id = RunId::new();
        Self {
            id,
            event,
            git_ref: decision.git_ref.clone(),
            commit_sha: commit_sha.into(),
            params,
            started_at: Utc::now(),
            work_dir: work_root.join(id.to_string()),
        }
    }

    /// True when the triggering ref is a tag; only such runs create releases.
    pub fn is_tag_triggered(&self) -> bool {
        self.git_ref.tag().is_some()
    }

    /// Directory the builder writes the executable into.
    pub fn dist_dir(&self) -> PathBuf {
        self.work_dir.join("dist")
    }
}

/// An unsigned executable produced by the builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artifact {
    run_id: RunId,
    name: String,
    path: PathBuf,
    size: u64,
    sha256: String,
}

impl Artifact {
    pub fn new(run_id: RunId, path: PathBuf, size: u64, sha256: String) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            run_id,
            name,
            path,
            size,
            sha256,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Marks this artifact as signed. Consumes it, so a build yields at most
    /// one signed artifact.
    pub fn into_signed(mut self, size: u64, sha256: String) -> SignedArtifact {
        self.size = size;
        self.sha256 = sha256;
        SignedArtifact {
            artifact: self,
            signed_at: Utc::now(),
        }
    }
}

/// An artifact after signing and timestamping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignedArtifact {
    #[serde(flatten)]
    artifact: Artifact,
    signed_at: DateTime<Utc>,
}

impl SignedArtifact {
    pub fn run_id(&self) -> RunId {
        self.artifact.run_id
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    pub fn path(&self) -> &Path {
        &self.artifact.path
    }

    pub fn size(&self) -> u64 {
        self.artifact.size
    }

    pub fn sha256(&self) -> &str {
        &self.artifact.sha256
    }

    pub fn signed_at(&self) -> DateTime<Utc> {
        self.signed_at
    }
}

/// Result of the artifact upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedArtifact {
    pub run_id: RunId,
    pub name: String,
    pub location: String,
    pub sha256: String,
}

/// A published release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub run_id: RunId,
    pub id: u64,
    pub tag: String,
    pub title: String,
    pub html_url: Option<String>,
    pub asset_name: String,
}

/// What the publisher did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub upload: Option<UploadedArtifact>,
    pub release: Option<Release>,
}

/// Status of one stage in the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    InProgress,
    Succeeded,
    Failed {
        stage: Option<Stage>,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        partial: Vec<String>,
    },
}

/// Summary written to `run.json` at the end of a run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub event: EventKind,
    pub git_ref: GitRef,
    pub commit_sha: String,
    pub params: RunParams,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: Outcome,
    pub stages: Vec<StageRecord>,
    pub artifact: Option<SignedArtifact>,
    pub publication: Publication,
}

impl RunReport {
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            run_id: ctx.id,
            event: ctx.event,
            git_ref: ctx.git_ref.clone(),
            commit_sha: ctx.commit_sha.clone(),
            params: ctx.params.clone(),
            started_at: ctx.started_at,
            finished_at: None,
            outcome: Outcome::InProgress,
            stages: Vec::new(),
            artifact: None,
            publication: Publication::default(),
        }
    }

    pub(crate) fn record(&mut self, stage: Stage, started_at: DateTime<Utc>, error: Option<&Error>) {
        self.stages.push(StageRecord {
            stage,
            status: if error.is_some() {
                StageStatus::Failed
            } else {
                StageStatus::Succeeded
            },
            started_at,
            finished_at: Utc::now(),
            message: error.map(ToString::to_string),
        });
    }

    pub(crate) fn finish(&mut self, error: Option<&Error>) {
        self.finished_at = Some(Utc::now());
        self.outcome = match error {
            None => Outcome::Succeeded,
            Some(e) => Outcome::Failed {
                stage: e.stage(),
                message: e.to_string(),
                partial: e.partial_state().to_vec(),
            },
        };
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }
}
