//! Code signing settings.

use serde::Deserialize;
use std::path::PathBuf;

/// Default timestamp authority for trusted signing.
pub const DEFAULT_TIMESTAMP_URL: &str = "http://timestamp.acs.microsoft.com";

/// Default file and timestamp digest.
pub const DEFAULT_DIGEST: &str = "SHA256";

/// Trusted signing configuration.
///
/// # Configuration
///
/// ```toml
/// [signing]
/// endpoint = "https://eus.codesigning.azure.net/"
/// files = "*.exe"
/// dlib = "C:/tools/Azure.CodeSigning.Dlib.dll"
/// ```
///
/// Credentials are never read from this file; see [`CredentialEnv`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningSettings {
    /// Signing service endpoint written into the signing metadata.
    ///
    /// Default: "https://eus.codesigning.azure.net/"
    pub endpoint: String,

    /// Glob selecting which files in the artifact directory get signed.
    ///
    /// Default: "*.exe"
    pub files: String,

    /// Timestamp authority URL.
    ///
    /// Default: [`DEFAULT_TIMESTAMP_URL`]
    pub timestamp_url: String,

    /// Digest used for both the file signature and the timestamp.
    ///
    /// Default: [`DEFAULT_DIGEST`]
    pub digest: String,

    /// Signing tool executable.
    ///
    /// Default: "signtool"
    pub tool: PathBuf,

    /// Trusted signing client library passed to the tool with `/dlib`.
    ///
    /// Default: None
    pub dlib: Option<PathBuf>,

    /// Custom sign command replacing the default tool invocation.
    ///
    /// Each element is a template; `{{file}}`, `{{metadata}}`,
    /// `{{timestamp_url}}` and `{{digest}}` are substituted. Runs once per file.
    ///
    /// Example: `["osslsigncode", "sign", "-ts", "{{timestamp_url}}", "{{file}}"]`
    ///
    /// Default: None
    pub command: Option<Vec<String>>,

    /// Names of the environment variables holding credentials.
    pub credentials: CredentialEnv,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://eus.codesigning.azure.net/".to_string(),
            files: "*.exe".to_string(),
            timestamp_url: DEFAULT_TIMESTAMP_URL.to_string(),
            digest: DEFAULT_DIGEST.to_string(),
            tool: PathBuf::from("signtool"),
            dlib: None,
            command: None,
            credentials: CredentialEnv::default(),
        }
    }
}

/// Environment variable names for signing credentials.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialEnv {
    /// Default: "AZURE_TENANT_ID"
    pub tenant_id: String,
    /// Default: "AZURE_CLIENT_ID"
    pub client_id: String,
    /// Default: "AZURE_CLIENT_SECRET"
    pub client_secret: String,
    /// Default: "SIGNING_ACCOUNT_NAME"
    pub account_name: String,
    /// Default: "CERTIFICATE_PROFILE_NAME"
    pub profile_name: String,
}

impl Default for CredentialEnv {
    fn default() -> Self {
        Self {
            tenant_id: "AZURE_TENANT_ID".to_string(),
            client_id: "AZURE_CLIENT_ID".to_string(),
            client_secret: "AZURE_CLIENT_SECRET".to_string(),
            account_name: "SIGNING_ACCOUNT_NAME".to_string(),
            profile_name: "CERTIFICATE_PROFILE_NAME".to_string(),
        }
    }
}
