//! Subcommand implementations and the helpers they share.

pub mod artifact_name;
pub mod doctor;
pub mod gate;
pub mod run;

use crate::error::{CliError, ReleaseError, Result};
use crate::pipeline::{EventKind, RunParams, Settings, TriggerEvent};

use super::{EventArgs, ParamArgs};

/// Builds the trigger event from flags (or their CI variables).
pub fn trigger_event(args: &EventArgs) -> Result<TriggerEvent> {
    let event = args
        .event
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| missing("event"))?;
    let git_ref = args
        .git_ref
        .as_deref()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| missing("ref"))?;

    let kind = EventKind::parse(event)?;
    Ok(TriggerEvent::new(kind, git_ref))
}

/// Run parameters: explicit flags first, then the configured variables.
///
/// Empty variables count as unset; values are otherwise passed through as-is.
pub fn run_params(args: &ParamArgs, settings: &Settings) -> RunParams {
    let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    RunParams {
        version: args
            .release_version
            .clone()
            .or_else(|| from_env(&settings.build().version_env)),
        service_url: args
            .service_url
            .clone()
            .or_else(|| from_env(&settings.build().service_url_env)),
    }
}

fn missing(argument: &str) -> ReleaseError {
    ReleaseError::Cli(CliError::MissingArgument {
        argument: argument.to_string(),
    })
}
