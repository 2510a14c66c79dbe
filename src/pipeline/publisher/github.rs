//! GitHub REST API release host.

use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::pipeline::error::{Error, ErrorExt, Result};
use crate::pipeline::run::SignedArtifact;

/// Whether the release tag had to be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagStatus {
    /// The tag already existed (normally pushed by the trigger)
    Existing,
    /// The tag was created at the run's commit
    Created,
}

/// Body of a create-release request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    pub tag_name: String,
    pub name: String,
    pub generate_release_notes: bool,
    pub draft: bool,
    pub prerelease: bool,
}

impl ReleaseRequest {
    /// A published, non-prerelease release with generated notes.
    pub fn new(tag: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tag_name: tag.into(),
            name: title.into(),
            generate_release_notes: true,
            draft: false,
            prerelease: false,
        }
    }
}

/// A release as returned by the host.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PublishedRelease {
    pub id: u64,
    #[serde(default)]
    pub html_url: Option<String>,
    pub upload_url: String,
}

/// Creates tags and releases and attaches assets.
pub trait ReleaseHost {
    fn ensure_tag(
        &self,
        tag: &str,
        commit_sha: &str,
    ) -> impl Future<Output = Result<TagStatus>> + Send;

    fn create_release(
        &self,
        request: &ReleaseRequest,
    ) -> impl Future<Output = Result<PublishedRelease>> + Send;

    fn attach_asset(
        &self,
        release: &PublishedRelease,
        artifact: &SignedArtifact,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Serialize)]
struct CreateRef<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

/// [`ReleaseHost`] backed by the GitHub REST API.
#[derive(Clone, Debug)]
pub struct GitHubReleases {
    client: Client,
    api_url: Url,
    repository: String,
}

impl GitHubReleases {
    /// Creates a client for `repository` (`owner/name`).
    pub fn new(api_url: &str, repository: &str, token: &str) -> Result<Self> {
        let mut parts = repository.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {}
            _ => {
                return Err(Error::Config(format!(
                    "repository must be owner/name, got {repository:?}"
                )));
            }
        }

        let mut api_url = Url::parse(api_url)?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Config(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url,
            repository: repository.to_string(),
        })
    }

    /// `<api>/repos/<owner>/<name>/<path>`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self
            .api_url
            .join(&format!("repos/{}/{path}", self.repository))?)
    }
}

/// Strips the RFC 6570 suffix (`{?name,label}`) from an upload URL and adds the
/// asset name.
pub fn asset_upload_url(upload_url: &str, asset_name: &str) -> Result<Url> {
    let base = upload_url.split('{').next().unwrap_or(upload_url);
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("name", asset_name);
    Ok(url)
}

/// Turns a non-success response into a publish error carrying the body.
async fn expect_success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Publish {
        message: format!("{what} failed ({status}): {body}"),
        partial: Vec::new(),
    })
}

impl ReleaseHost for GitHubReleases {
    async fn ensure_tag(&self, tag: &str, commit_sha: &str) -> Result<TagStatus> {
        let lookup = self.endpoint(&format!("git/ref/tags/{tag}"))?;
        let response = self.client.get(lookup).send().await?;
        if response.status() != StatusCode::NOT_FOUND {
            expect_success(response, "tag lookup").await?;
            log::info!("Tag {tag} already exists");
            return Ok(TagStatus::Existing);
        }

        let body = CreateRef {
            reference: format!("refs/tags/{tag}"),
            sha: commit_sha,
        };
        let response = self
            .client
            .post(self.endpoint("git/refs")?)
            .json(&body)
            .send()
            .await?;
        expect_success(response, "tag creation").await?;
        log::info!("✓ Created tag {tag} at {commit_sha}");
        Ok(TagStatus::Created)
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<PublishedRelease> {
        let response = self
            .client
            .post(self.endpoint("releases")?)
            .json(request)
            .send()
            .await?;
        let release: PublishedRelease = expect_success(response, "release creation")
            .await?
            .json()
            .await?;
        log::info!("✓ Created release {} for {}", release.id, request.tag_name);
        Ok(release)
    }

    async fn attach_asset(&self, release: &PublishedRelease, artifact: &SignedArtifact) -> Result<()> {
        let url = asset_upload_url(&release.upload_url, artifact.name())?;
        let file = tokio::fs::File::open(artifact.path())
            .await
            .fs_context("opening artifact for upload", artifact.path())?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_LENGTH, artifact.size())
            .body(body)
            .send()
            .await?;
        expect_success(response, "asset upload").await?;
        log::info!("✓ Attached {} to release {}", artifact.name(), release.id);
        Ok(())
    }
}
