//! External tool detection and availability checking.
//!
//! Locates the Python interpreter matching the configured version and reports
//! whether the signing tool and git are reachable.

use std::path::{Path, PathBuf};

/// Interpreter names tried, in order, for a version spec such as `3.11`.
fn python_candidates(version: &str) -> Vec<String> {
    let major = version.split('.').next().unwrap_or(version);
    vec![
        format!("python{version}"),
        format!("python{major}"),
        "python".to_string(),
    ]
}

/// True when `python --version` output (e.g. "Python 3.11.4") satisfies `spec`.
///
/// Matching is by dotted prefix, so "3.11" accepts "3.11.4" but not "3.110.0".
pub fn version_matches(reported: &str, spec: &str) -> bool {
    let reported = reported.trim();
    let number = reported.strip_prefix("Python ").unwrap_or(reported);
    number == spec
        || number
            .strip_prefix(spec)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Asks an interpreter for its version string.
async fn interpreter_version(path: &Path) -> Option<String> {
    let output = tokio::process::Command::new(path)
        .arg("--version")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    // Old interpreters print the version on stderr
    let text = if output.stdout.is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    Some(String::from_utf8_lossy(&text).trim().to_string())
}

/// Finds an interpreter on PATH whose version matches `spec`.
pub async fn find_python(spec: &str) -> Option<(PathBuf, String)> {
    for candidate in python_candidates(spec) {
        let Ok(path) = which::which(&candidate) else {
            log::debug!("{candidate} not found in PATH");
            continue;
        };
        match interpreter_version(&path).await {
            Some(reported) if version_matches(&reported, spec) => {
                log::info!("✓ Using {} ({reported})", path.display());
                return Some((path, reported));
            }
            Some(reported) => {
                log::debug!("{} reports {reported}, wanted {spec}", path.display());
            }
            None => log::warn!("{} found but --version failed", path.display()),
        }
    }
    None
}

/// Path of `tool` if it is on PATH (or is an existing path).
pub fn locate(tool: &Path) -> Option<PathBuf> {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool.display(), path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found: {e}", tool.display());
            None
        }
    }
}
