//! `doctor`: report what a run on this machine would be missing.

use std::path::Path;

use crate::cli::RuntimeConfig;
use crate::config;
use crate::error::Result;
use crate::pipeline::{Settings, SettingsBuilder, tool_detection};

/// Checks tools, files and variable names. Exit code 1 when a run could not
/// get past provisioning or building.
pub async fn execute(config_path: &Path, runtime: &RuntimeConfig) -> Result<i32> {
    let settings = if config_path.is_file() {
        config::load_config(config_path)?
    } else {
        runtime.warn(&format!(
            "{} not found, checking defaults",
            config_path.display()
        ))?;
        SettingsBuilder::new()
            .app_name("picologs")
            .work_root(".")
            .build()?
    };

    let mut blocking = 0;

    runtime.section("Tools")?;
    let python = &settings.environment().python;
    match tool_detection::find_python(python).await {
        Some((path, version)) => {
            runtime.success(&format!("{version} at {}", path.display()))?
        }
        None => {
            blocking += 1;
            runtime.error(&format!("no Python {python} interpreter on PATH"))?
        }
    }
    report_tool(runtime, &settings.signing().tool, "signing")?;
    report_tool(runtime, Path::new("git"), "commit lookup")?;

    runtime.section("Files")?;
    let entry = &settings.build().entry_point;
    if entry.is_file() {
        runtime.success(&format!("entry point {}", entry.display()))?;
    } else {
        blocking += 1;
        runtime.error(&format!("entry point {} not found", entry.display()))?;
    }
    if let Some(requirements) = &settings.environment().requirements {
        if requirements.is_file() {
            runtime.success(&format!("requirements {}", requirements.display()))?;
        } else {
            blocking += 1;
            runtime.error(&format!("requirements {} not found", requirements.display()))?;
        }
    }
    if let Some(dlib) = &settings.signing().dlib {
        if dlib.is_file() {
            runtime.success(&format!("signing library {}", dlib.display()))?;
        } else {
            runtime.warn(&format!("signing library {} not found", dlib.display()))?;
        }
    }

    runtime.section("Environment")?;
    report_variables(runtime, &settings)?;

    if blocking == 0 {
        runtime.success("ready")?;
        Ok(0)
    } else {
        runtime.error(&format!("{blocking} problem(s) would stop a run"))?;
        Ok(1)
    }
}

fn report_tool(runtime: &RuntimeConfig, tool: &Path, purpose: &str) -> Result<()> {
    match tool_detection::locate(tool) {
        Some(path) => runtime.success(&format!("{} ({purpose}) at {}", tool.display(), path.display()))?,
        None => runtime.warn(&format!("{} ({purpose}) not found", tool.display()))?,
    }
    Ok(())
}

/// Reports which variables are set. Values are never printed.
fn report_variables(runtime: &RuntimeConfig, settings: &Settings) -> Result<()> {
    let credentials = &settings.signing().credentials;
    let names = [
        settings.build().version_env.as_str(),
        settings.build().service_url_env.as_str(),
        credentials.tenant_id.as_str(),
        credentials.client_id.as_str(),
        credentials.client_secret.as_str(),
        credentials.account_name.as_str(),
        credentials.profile_name.as_str(),
        settings.publish().token_env.as_str(),
    ];

    for name in names {
        let set = std::env::var(name).is_ok_and(|v| !v.is_empty());
        if set {
            runtime.success(&format!("{name} is set"))?;
        } else {
            runtime.warn(&format!("{name} is not set"))?;
        }
    }
    Ok(())
}
