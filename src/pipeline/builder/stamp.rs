//! Build-time stamping of the entry point.
//!
//! The application carries a `VERSION = "..."` assignment and a service URL
//! placeholder that are filled in at build time. Stamping happens on a staged
//! copy; the source tree is never modified. Values are inserted verbatim.

use regex::{Captures, Regex};

use crate::pipeline::error::{Error, Result};
use crate::pipeline::run::RunParams;
use crate::pipeline::settings::BuildSettings;

/// Stamped source plus what was actually replaced.
#[derive(Debug, PartialEq, Eq)]
pub struct Stamped {
    pub source: String,
    pub version_stamped: bool,
    pub service_url_stamped: bool,
}

fn version_assignment(variable: &str) -> Result<Regex> {
    let pattern = format!(
        r#"(?m)^(?P<indent>[ \t]*){}[ \t]*=[ \t]*(?:"[^"\n]*"|'[^'\n]*')"#,
        regex::escape(variable)
    );
    Regex::new(&pattern).map_err(|e| Error::Build(format!("invalid version variable {variable:?}: {e}")))
}

/// Applies the run's parameters to `source`.
///
/// Only the first assignment to the version variable is rewritten; every
/// occurrence of the service URL placeholder is replaced.
pub fn stamp_source(source: &str, build: &BuildSettings, params: &RunParams) -> Result<Stamped> {
    let mut stamped = source.to_string();
    let mut version_stamped = false;
    let mut service_url_stamped = false;

    if let Some(version) = &params.version {
        if version.contains(['"', '\\', '\n', '\r']) {
            return Err(Error::Build(format!(
                "version {version:?} cannot be stamped into a string literal"
            )));
        }
        let re = version_assignment(&build.version_variable)?;
        if re.is_match(&stamped) {
            let variable = &build.version_variable;
            stamped = re
                .replace(&stamped, |caps: &Captures| {
                    format!("{}{variable} = \"{version}\"", &caps["indent"])
                })
                .into_owned();
            version_stamped = true;
        } else {
            log::warn!(
                "No `{} = \"...\"` assignment in entry point; version not stamped",
                build.version_variable
            );
        }
    }

    if let Some(url) = &params.service_url {
        let placeholder = &build.service_url_placeholder;
        if !placeholder.is_empty() && stamped.contains(placeholder.as_str()) {
            stamped = stamped.replace(placeholder.as_str(), url);
            service_url_stamped = true;
        } else {
            log::warn!("Placeholder {placeholder} not found in entry point; service URL not stamped");
        }
    }

    Ok(Stamped {
        source: stamped,
        version_stamped,
        service_url_stamped,
    })
}
