//! External command execution with streamed output and optional timeout.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use super::error::{Error, Result};
use crate::bail;

/// How many stderr lines are kept for error messages.
const STDERR_TAIL: usize = 20;

/// Result of a finished command.
pub struct CommandOutput {
    /// Exit status of the command
    pub status: ExitStatus,
    /// Captured stdout lines
    pub stdout_lines: Vec<String>,
    /// Captured stderr lines
    pub stderr_lines: Vec<String>,
}

impl CommandOutput {
    /// Last few stderr lines, joined for an error message.
    pub fn stderr_tail(&self) -> String {
        let start = self.stderr_lines.len().saturating_sub(STDERR_TAIL);
        self.stderr_lines[start..].join("\n")
    }

    /// Describes a non-zero exit for `label`.
    pub fn failure(&self, label: &str) -> String {
        let tail = self.stderr_tail();
        if tail.is_empty() {
            format!("{label} exited with {}", self.status)
        } else {
            format!("{label} exited with {}:\n{tail}", self.status)
        }
    }
}

/// Runs `command`, logging stdout as it arrives and capturing stderr.
///
/// `label` names the command in logs and errors; arguments are never logged
/// because some commands receive credential-bearing paths. A command that
/// outlives `timeout` is killed and reported as an error.
pub async fn run(
    command: &mut Command,
    label: &str,
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    log::debug!("Running {label}");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|error| Error::CommandFailed {
            command: label.to_string(),
            error,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Both streams must drain before the exit status is read
    let streams = async {
        tokio::join!(
            async {
                match stdout {
                    Some(stdout) => read_lines(stdout, label, log::Level::Info).await,
                    None => Vec::new(),
                }
            },
            async {
                match stderr {
                    Some(stderr) => read_lines(stderr, label, log::Level::Debug).await,
                    None => Vec::new(),
                }
            }
        )
    };

    let finished = async {
        let (stdout_lines, stderr_lines) = streams.await;
        let status = child.wait().await;
        (status, stdout_lines, stderr_lines)
    };

    let (status, stdout_lines, stderr_lines) = match timeout {
        Some(limit) => match tokio::time::timeout(limit, finished).await {
            Ok(done) => done,
            Err(_elapsed) => {
                // kill_on_drop terminates the child when it goes out of scope
                bail!("{label} timed out after {} seconds", limit.as_secs())
            }
        },
        None => finished.await,
    };

    let status = status.map_err(|error| Error::CommandFailed {
        command: label.to_string(),
        error,
    })?;

    Ok(CommandOutput {
        status,
        stdout_lines,
        stderr_lines,
    })
}

/// Reads `stream` to EOF, logging each line at `level`.
///
/// Bytes that are not UTF-8 are replaced rather than ending the read; the
/// pipe is drained even after a read error so the child never blocks or
/// receives SIGPIPE.
async fn read_lines<R>(stream: R, label: &str, level: log::Level) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut captured = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                log::log!(level, "[{label}] {line}");
                captured.push(line);
            }
            Err(error) => {
                log::debug!("[{label}] output unreadable: {error}");
                if let Err(error) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
                    log::debug!("[{label}] discarding output failed: {error}");
                }
                break;
            }
        }
    }
    captured
}
