//! Command line interface for the release pipeline.
//!
//! Parses arguments, loads `release.toml` and dispatches to the subcommand.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, EventArgs, ParamArgs, RuntimeConfig};
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Execute already-parsed arguments
pub async fn execute(args: Args) -> Result<i32> {
    let runtime = RuntimeConfig::from(&args);

    match args.command {
        Command::Doctor => commands::doctor::execute(&args.config, &runtime).await,
        Command::Gate { event, json } => {
            let settings = crate::config::load_config(&args.config)?;
            commands::gate::execute(&settings, &event, json, &runtime)
        }
        Command::ArtifactName { params, git_ref } => {
            let settings = crate::config::load_config(&args.config)?;
            commands::artifact_name::execute(&settings, &params, git_ref.as_deref())
        }
        Command::Run { event, params, sha } => {
            let settings = crate::config::load_config(&args.config)?;
            commands::run::execute(settings, &event, &params, sha, &runtime).await
        }
    }
}
