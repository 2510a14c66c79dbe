//! Signer stage: submits the artifact to the signing authority.
//!
//! Signing happens in place; the returned [`SignedArtifact`] points at the same
//! path with a refreshed checksum.

mod credentials;
mod trusted;

use std::future::Future;

use super::error::Result;
use super::run::{Artifact, RunContext, SignedArtifact};

pub use credentials::SigningCredentials;
pub use trusted::{SigningMetadata, TrustedSigner};

/// Signs one artifact. Consumes it so it cannot be signed twice.
pub trait ArtifactSigner {
    fn sign(
        &self,
        ctx: &RunContext,
        artifact: Artifact,
    ) -> impl Future<Output = Result<SignedArtifact>> + Send;
}
