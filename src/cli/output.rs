//! Colored terminal output for user-facing progress.
//!
//! Diagnostics go through `log`; this is what a person running the tool sees.

use colored::Colorize;
use std::io::{self, Write};

/// Writes status lines to stdout (and warnings to stderr).
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            writeln!(io::stdout(), "{}", message.dimmed())?;
        }
        Ok(())
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stderr(), "{} {}", "⚠".yellow().bold(), message.yellow())?;
        }
        Ok(())
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr(), "{} {}", "✗".red().bold(), message.red())
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "{} {}", "✓".green().bold(), message)?;
        }
        Ok(())
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "{} {}", "▶".cyan(), message)?;
        }
        Ok(())
    }

    pub fn section(&self, title: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout())?;
            writeln!(io::stdout(), "{}", title.bold().underline())?;
        }
        Ok(())
    }

    pub fn indent(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "  {message}")?;
        }
        Ok(())
    }
}
