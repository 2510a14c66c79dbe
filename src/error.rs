//! Top-level error types for the release tool.
//!
//! Wraps pipeline errors together with CLI and configuration failures and
//! maps each to actionable recovery suggestions.

use thiserror::Error;

use crate::pipeline::{self, Stage};

/// Result type alias for release tool operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for the release tool
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline errors
    #[error("{0}")]
    Pipeline(#[from] pipeline::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Pipeline(e) => match e.stage() {
                Some(Stage::Provision) => vec![
                    "Check that the configured Python version is installed and on PATH".to_string(),
                    "Verify the requirements file exists and its packages resolve".to_string(),
                ],
                Some(Stage::Build) => vec![
                    "Set the version variable, or run from a tag, when naming is versioned"
                        .to_string(),
                    "Inspect the PyInstaller output above (RUST_LOG=debug shows stderr)".to_string(),
                ],
                Some(Stage::Sign) => vec![
                    "Verify all signing credential variables are set and non-empty".to_string(),
                    "Check that the signing tool and its client library are installed".to_string(),
                ],
                Some(Stage::Publish) => {
                    let mut tips = vec![
                        "Check the API token has write access to the repository".to_string(),
                    ];
                    for state in e.partial_state() {
                        tips.push(format!("Clean up manually if unwanted: {state}"));
                    }
                    tips
                }
                None => vec!["Check the error message above for specific details".to_string()],
            },
            ReleaseError::Toml(_) => {
                vec!["Fix the syntax or unknown keys in the configuration file".to_string()]
            }
            ReleaseError::Cli(CliError::MissingArgument { argument }) => {
                vec![format!("Pass --{argument} or set its CI environment variable")]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
