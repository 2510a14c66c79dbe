//! Release pipeline for the picologs desktop client
//!
//! This library drives one release run end to end:
//! - decides whether a repository event starts a run
//! - provisions a Python environment and packages a one-file executable
//! - signs it with a trusted timestamp
//! - uploads it and, for tag runs, publishes a GitHub release
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use error::{CliError, ReleaseError, Result};
