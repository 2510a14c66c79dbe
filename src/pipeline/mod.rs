//! Release pipeline: trigger gate, provisioning, build, signing, publishing.
//!
//! # Overview
//!
//! One run:
//! 1. The [`trigger`] gate accepts or rejects a repository event
//! 2. [`PythonProvisioner`] builds an isolated interpreter environment
//! 3. [`PyInstallerBuilder`] stamps and packages the entry point
//! 4. [`TrustedSigner`] signs the executable in place with a trusted timestamp
//! 5. [`Publisher`] uploads it and, for tag runs, creates the release
//!
//! Each stage sits behind a trait ([`EnvironmentProvisioner`],
//! [`ArtifactBuilder`], [`ArtifactSigner`], [`ArtifactStore`],
//! [`ReleaseHost`]) so the [`Pipeline`] can be driven with other backends.

pub mod builder;
pub mod error;
pub mod naming;
mod orchestrator;
pub mod process;
pub mod provision;
pub mod publisher;
pub mod run;
pub mod settings;
pub mod signer;
pub mod tool_detection;
pub mod trigger;
pub mod utils;

pub use builder::{ArtifactBuilder, PyInstallerBuilder};
pub use error::{Error, Result, Stage};
pub use naming::ArtifactNaming;
pub use orchestrator::{Pipeline, REPORT_FILE};
pub use provision::{BuildEnvironment, EnvironmentProvisioner, PythonProvisioner};
pub use publisher::{
    ArtifactStore, GitHubReleases, LocalArtifactStore, PublishedRelease, Publisher, ReleaseHost,
    ReleaseRequest, TagStatus,
};
pub use run::{
    Artifact, Outcome, Publication, Release, RunContext, RunId, RunParams, RunReport,
    SignedArtifact, UploadedArtifact,
};
pub use settings::{
    BuildSettings, CredentialEnv, EnvironmentSettings, PublishSettings, Settings,
    SettingsBuilder, SigningSettings,
};
pub use signer::{ArtifactSigner, SigningCredentials, TrustedSigner};
pub use trigger::{EventKind, GitRef, TriggerDecision, TriggerEvent, TriggerPolicy, evaluate};
