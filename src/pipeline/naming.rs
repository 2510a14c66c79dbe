//! Deterministic artifact naming shared by the builder, signer and publisher.

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::run::RunParams;

/// Naming convention for the produced executable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactNaming {
    /// `<app>[.ext]` for every run
    Fixed,
    /// `<app>-<version>[.ext]`; requires a version
    #[default]
    Versioned,
}

/// File stem for the artifact (no extension).
///
/// The version is used verbatim, but must not contain a path separator since
/// it becomes part of a file name.
pub fn artifact_stem(app: &str, naming: ArtifactNaming, params: &RunParams) -> Result<String> {
    match naming {
        ArtifactNaming::Fixed => Ok(app.to_string()),
        ArtifactNaming::Versioned => {
            let version = params
                .version
                .as_deref()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::Build(format!(
                        "versioned artifact naming requires a version for {app}"
                    ))
                })?;
            if version.contains(['/', '\\']) {
                return Err(Error::Build(format!(
                    "version {version:?} cannot be used in a file name"
                )));
            }
            Ok(format!("{app}-{version}"))
        }
    }
}

/// Full artifact file name: stem plus extension (if any).
pub fn artifact_file_name(
    app: &str,
    naming: ArtifactNaming,
    extension: &str,
    params: &RunParams,
) -> Result<String> {
    let stem = artifact_stem(app, naming, params)?;
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        Ok(stem)
    } else {
        Ok(format!("{stem}.{extension}"))
    }
}
