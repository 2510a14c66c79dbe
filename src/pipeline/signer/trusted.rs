//! Trusted signing through an external signing tool.

use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::ArtifactSigner;
use super::credentials::SigningCredentials;
use crate::pipeline::builder::checksum::calculate_sha256;
use crate::pipeline::error::{Error, ErrorExt, Result};
use crate::pipeline::process;
use crate::pipeline::run::{Artifact, RunContext, SignedArtifact};
use crate::pipeline::settings::Settings;
use crate::pipeline::utils::fs;

/// Metadata file handed to the signing client library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SigningMetadata {
    pub endpoint: String,
    pub code_signing_account_name: String,
    pub certificate_profile_name: String,
}

/// Signs artifacts with the configured tool and a trusted timestamp.
#[derive(Clone, Debug)]
pub struct TrustedSigner {
    settings: Settings,
    credentials: SigningCredentials,
}

impl TrustedSigner {
    pub fn new(settings: Settings, credentials: SigningCredentials) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    pub fn metadata(&self) -> SigningMetadata {
        SigningMetadata {
            endpoint: self.settings.signing().endpoint.clone(),
            code_signing_account_name: self.credentials.account_name.clone(),
            certificate_profile_name: self.credentials.profile_name.clone(),
        }
    }

    /// Files in `dir` whose names match the configured filter, sorted.
    pub async fn select_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let pattern = glob::Pattern::new(&self.settings.signing().files)?;
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .fs_context("reading artifact directory", dir)?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .fs_context("reading artifact directory", dir)?
        {
            let path = entry.path();
            let name = entry.file_name();
            if path.is_file() && pattern.matches(&name.to_string_lossy()) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Arguments for the default tool: one invocation covering every file.
    pub fn default_args(&self, files: &[PathBuf], metadata: &Path) -> Result<Vec<String>> {
        let signing = self.settings.signing();
        let dlib = signing.dlib.as_ref().ok_or_else(|| {
            Error::Signing("signing.dlib must point at the trusted signing client library".into())
        })?;

        let mut args = vec![
            "sign".to_string(),
            "/v".to_string(),
            "/fd".to_string(),
            signing.digest.clone(),
            "/tr".to_string(),
            signing.timestamp_url.clone(),
            "/td".to_string(),
            signing.digest.clone(),
            "/dlib".to_string(),
            dlib.display().to_string(),
            "/dmdf".to_string(),
            metadata.display().to_string(),
        ];
        args.extend(files.iter().map(|f| f.display().to_string()));
        Ok(args)
    }

    /// Renders a custom command template for one file.
    pub fn render_command(
        &self,
        template: &[String],
        file: &Path,
        metadata: &Path,
    ) -> Result<Vec<String>> {
        let signing = self.settings.signing();
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        let data = serde_json::json!({
            "file": file.display().to_string(),
            "metadata": metadata.display().to_string(),
            "timestamp_url": signing.timestamp_url,
            "digest": signing.digest,
        });
        template
            .iter()
            .map(|part| registry.render_template(part, &data).map_err(Error::from))
            .collect()
    }

    async fn invoke(&self, program: &Path, args: Vec<String>) -> Result<()> {
        let label = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "signing tool".to_string());

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env("AZURE_TENANT_ID", &self.credentials.tenant_id)
            .env("AZURE_CLIENT_ID", &self.credentials.client_id)
            .env("AZURE_CLIENT_SECRET", &self.credentials.client_secret);

        let output = process::run(&mut cmd, &label, self.settings.command_timeout()).await?;
        if !output.status.success() {
            return Err(Error::Signing(output.failure(&label)));
        }
        Ok(())
    }
}

impl ArtifactSigner for TrustedSigner {
    async fn sign(&self, ctx: &RunContext, artifact: Artifact) -> Result<SignedArtifact> {
        self.credentials.validate()?;

        let signing = self.settings.signing();
        let pattern = glob::Pattern::new(&signing.files)?;
        if !pattern.matches(artifact.name()) {
            return Err(Error::Signing(format!(
                "{} does not match the signing filter {}",
                artifact.name(),
                signing.files
            )));
        }

        let dir = artifact
            .path()
            .parent()
            .ok_or_else(|| Error::Signing("artifact has no parent directory".into()))?
            .to_path_buf();
        let files = self.select_files(&dir).await?;
        log::info!("Signing {} file(s) matching {}", files.len(), signing.files);

        let metadata_path = ctx.work_dir.join("signing-metadata.json");
        fs::write_file(&metadata_path, serde_json::to_vec_pretty(&self.metadata())?).await?;

        match &signing.command {
            Some(template) if !template.is_empty() => {
                for file in &files {
                    let mut argv = self.render_command(template, file, &metadata_path)?;
                    let program = PathBuf::from(argv.remove(0));
                    self.invoke(&program, argv).await?;
                }
            }
            _ => {
                let args = self.default_args(&files, &metadata_path)?;
                self.invoke(&signing.tool, args).await?;
            }
        }

        let (sha256, size) = calculate_sha256(artifact.path()).await?;
        log::info!("✓ Signed {} (sha256 {sha256})", artifact.name());
        Ok(artifact.into_signed(size, sha256))
    }
}
