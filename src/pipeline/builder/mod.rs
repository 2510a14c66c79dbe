//! Builder stage: turns the entry point into one executable artifact.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`pyinstaller`] - The [`PyInstallerBuilder`] implementation
//! - [`stamp`] - Build-time substitution of version and service URL

pub(crate) mod checksum;
mod pyinstaller;
pub mod stamp;

use std::future::Future;

use super::error::Result;
use super::provision::BuildEnvironment;
use super::run::{Artifact, RunContext};

pub use pyinstaller::PyInstallerBuilder;

/// Produces exactly one artifact per run at a deterministic path.
pub trait ArtifactBuilder {
    fn build(
        &self,
        ctx: &RunContext,
        env: &BuildEnvironment,
    ) -> impl Future<Output = Result<Artifact>> + Send;
}
