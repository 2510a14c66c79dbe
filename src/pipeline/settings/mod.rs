//! Configuration structures for pipeline runs.
//!
//! This module provides the deployment-time configuration for every stage,
//! plus a builder for constructing [`Settings`]. Secrets never live here; they
//! are read from the environment when a run starts.

mod build;
mod builder;
mod core;
mod environment;
mod publish;
mod signing;

// Re-export all public types
pub use build::BuildSettings;
pub use builder::SettingsBuilder;
pub use self::core::Settings;
pub use environment::EnvironmentSettings;
pub use publish::PublishSettings;
pub use signing::{CredentialEnv, SigningSettings};
