//! Error types for pipeline stages.
//!
//! Every error that escapes a stage is classified into one of the four stage
//! variants ([`Error::EnvironmentSetup`], [`Error::Build`], [`Error::Signing`],
//! [`Error::Publish`]) by [`Error::in_stage`]. The remaining variants are
//! plumbing used inside stages.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Interpreter lookup and dependency installation
    Provision,
    /// Packaging the entry point into an executable
    Build,
    /// Submitting the executable to the signing authority
    Sign,
    /// Artifact upload and release creation
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Provision => "provision",
            Stage::Build => "build",
            Stage::Sign => "sign",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Errors raised while running the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Interpreter missing or dependency installation failed
    #[error("environment setup failed: {0}")]
    EnvironmentSetup(String),

    /// Packaging failed or produced no artifact
    #[error("build failed: {0}")]
    Build(String),

    /// Authentication or signing-service failure
    #[error("signing failed: {0}")]
    Signing(String),

    /// Upload or release API failure.
    ///
    /// `partial` lists remote state that was already created before the
    /// failure and is left in place.
    #[error("publish failed: {message}")]
    Publish {
        /// What went wrong
        message: String,
        /// Remote state created before the failure
        partial: Vec<String>,
    },

    /// An external command could not be started
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Program name
        command: String,
        /// Spawn error
        error: std::io::Error,
    },

    /// Filesystem error with path context
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// IO errors without path context
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Template rendering errors
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Invalid glob pattern
    #[error("invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns the stage this error is attributed to, if it has been classified.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::EnvironmentSetup(_) => Some(Stage::Provision),
            Error::Build(_) => Some(Stage::Build),
            Error::Signing(_) => Some(Stage::Sign),
            Error::Publish { .. } => Some(Stage::Publish),
            _ => None,
        }
    }

    /// Classifies a plumbing error into `stage`.
    ///
    /// Errors that are already attributed to a stage are returned unchanged.
    pub fn in_stage(self, stage: Stage) -> Self {
        if self.stage().is_some() {
            return self;
        }
        let message = self.to_string();
        match stage {
            Stage::Provision => Error::EnvironmentSetup(message),
            Stage::Build => Error::Build(message),
            Stage::Sign => Error::Signing(message),
            Stage::Publish => Error::Publish {
                message,
                partial: Vec::new(),
            },
        }
    }

    /// Remote state left behind by a failed publish.
    pub fn partial_state(&self) -> &[String] {
        match self {
            Error::Publish { partial, .. } => partial,
            _ => &[],
        }
    }
}

/// Adds path context to IO results.
pub trait ErrorExt<T> {
    /// Attach a description and the path that was being accessed.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Converts an `Option` into a configuration error.
pub trait Context<T> {
    /// Fail with `message` when the value is absent.
    fn context(self, message: &str) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context(self, message: &str) -> Result<T> {
        self.ok_or_else(|| Error::Config(message.to_string()))
    }
}

/// Return early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::pipeline::Error::GenericError(format!($($arg)*)))
    };
}
