//! Command line argument parsing.
//!
//! Event details fall back to the variables a CI runner exports, so inside a
//! workflow `picologs_release run` needs no flags at all.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

/// Release pipeline for the picologs desktop client
#[derive(Parser, Debug)]
#[command(
    name = "picologs_release",
    version,
    about = "Release pipeline for the picologs desktop client",
    long_about = "Gates a repository event, then provisions a Python environment, packages a
one-file executable, signs it and publishes it.

Usage:
  picologs_release run --event push --ref refs/tags/v1.2.3
  picologs_release gate --event workflow_dispatch --ref refs/heads/main
  picologs_release artifact-name --version 1.2.3
  picologs_release doctor

Exit code 0 = run succeeded or the event was skipped by the gate."
)]
pub struct Args {
    /// Pipeline configuration file
    #[arg(short, long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print extra detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the trigger gate and, if accepted, execute the pipeline
    Run {
        #[command(flatten)]
        event: EventArgs,

        #[command(flatten)]
        params: ParamArgs,

        /// Commit SHA of the run (default: HEAD of the current checkout)
        #[arg(long, env = "GITHUB_SHA", value_name = "SHA")]
        sha: Option<String>,
    },

    /// Evaluate the trigger gate only and print the decision
    Gate {
        #[command(flatten)]
        event: EventArgs,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the artifact file name a run with these parameters produces
    ArtifactName {
        #[command(flatten)]
        params: ParamArgs,

        /// Triggering ref; a tag supplies the version when none is given
        #[arg(long = "ref", env = "GITHUB_REF", value_name = "REF")]
        git_ref: Option<String>,
    },

    /// Report which external tools are available
    Doctor,
}

/// The repository event being evaluated.
#[derive(ClapArgs, Debug, Clone)]
pub struct EventArgs {
    /// Event kind: push or workflow_dispatch
    #[arg(long, env = "GITHUB_EVENT_NAME", value_name = "EVENT")]
    pub event: Option<String>,

    /// Full ref name, e.g. refs/tags/v1.2.3 or refs/heads/main
    #[arg(long = "ref", env = "GITHUB_REF", value_name = "REF")]
    pub git_ref: Option<String>,
}

/// Build-time parameters. Unset flags fall back to the environment variables
/// named in the configuration.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Version stamped into the build and used in the artifact name
    #[arg(long = "version", value_name = "VERSION")]
    pub release_version: Option<String>,

    /// External service connection string stamped into the build
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
