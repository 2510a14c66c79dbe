//! Signing credentials sourced from the environment.

use std::fmt;

use crate::pipeline::error::{Error, Result};
use crate::pipeline::settings::CredentialEnv;

/// Opaque credentials for the signing service.
///
/// `Debug` never prints the secret values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub account_name: String,
    pub profile_name: String,
}

impl SigningCredentials {
    /// Reads every credential from the variables named in `names`.
    /// Missing variables become empty strings and fail [`validate`](Self::validate).
    pub fn from_env(names: &CredentialEnv) -> Self {
        let read = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            tenant_id: read(&names.tenant_id),
            client_id: read(&names.client_id),
            client_secret: read(&names.client_secret),
            account_name: read(&names.account_name),
            profile_name: read(&names.profile_name),
        }
    }

    /// Fails with a signing error naming every empty credential.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("tenant id", &self.tenant_id),
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("signing account name", &self.account_name),
            ("certificate profile name", &self.profile_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Signing(format!(
                "missing credentials: {}",
                missing.join(", ")
            )))
        }
    }
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("SigningCredentials")
            .field("tenant_id", &redact(&self.tenant_id))
            .field("client_id", &redact(&self.client_id))
            .field("client_secret", &redact(&self.client_secret))
            .field("account_name", &self.account_name)
            .field("profile_name", &self.profile_name)
            .finish()
    }
}
