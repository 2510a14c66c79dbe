//! Shared helpers for pipeline stages.

pub mod fs;
