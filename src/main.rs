//! picologs_release - release pipeline for the picologs desktop client.
//!
//! Gates a repository event, then provisions, builds, signs and publishes the
//! executable. Exit code 0 means the run succeeded or was skipped by the gate.

use picologs_release::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  → {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
