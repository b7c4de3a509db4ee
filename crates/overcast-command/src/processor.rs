//! Execution of [`Command`]s as OS processes.

use crate::error::{CommandError, Result};
use crate::{Command, CommandResponse};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, trace, warn};

/// Runs commands and classifies their exit codes.
///
/// Implementations must return `Ok` only for exit code zero. A process that
/// ran and failed is reported as [`CommandError::NonZeroExit`], one that could
/// not be started as [`CommandError::Execution`].
#[async_trait]
pub trait CommandProcessor: Send + Sync {
    /// Run `command` to completion and return its captured output.
    async fn run(&self, command: &Command) -> Result<CommandResponse>;
}

/// [`CommandProcessor`] backed by `tokio::process`.
///
/// stdout and stderr are drained concurrently while the process runs, so a
/// chatty child never blocks on a full pipe. The call returns once the process
/// has exited and both streams reached EOF.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner that waits for processes indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill processes that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn spawn(command: &Command) -> Result<Child> {
        let mut process = tokio::process::Command::new(command.executable());
        process
            .args(command.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = command.working_dir() {
            process.current_dir(dir);
        }

        process.spawn().map_err(|source| {
            warn!(command = %command, error = %source, "failed to start process");
            CommandError::Execution {
                command: command.clone(),
                source,
            }
        })
    }
}

#[async_trait]
impl CommandProcessor for ProcessRunner {
    async fn run(&self, command: &Command) -> Result<CommandResponse> {
        let start = Instant::now();
        debug!(
            command = %command,
            dir = ?command.working_dir(),
            "running command"
        );

        let mut child = Self::spawn(command)?;

        let outcome = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, wait_with_output(&mut child)).await;
                match waited {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(command = %command, timeout = ?limit, "command timed out, killing it");
                        if let Err(e) = child.kill().await {
                            warn!(command = %command, error = %e, "failed to kill timed out process");
                        }
                        return Err(CommandError::Timeout {
                            command: command.clone(),
                            timeout: limit,
                        });
                    }
                }
            }
            None => wait_with_output(&mut child).await,
        };

        let (status, stdout, stderr) = outcome.map_err(|source| CommandError::Execution {
            command: command.clone(),
            source,
        })?;

        let response = CommandResponse {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };
        debug!(
            command = %command,
            exit_code = response.exit_code,
            stdout_len = response.stdout.len(),
            stderr_len = response.stderr.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "command finished"
        );
        trace!(stdout = %response.stdout, stderr = %response.stderr, "command output");

        if !response.is_success() {
            warn!(command = %command, exit_code = response.exit_code, "command failed");
            return Err(CommandError::NonZeroExit {
                command: command.clone(),
                response,
            });
        }
        Ok(response)
    }
}

/// Wait for exit while draining both output pipes on the same task.
async fn wait_with_output(child: &mut Child) -> std::io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    tokio::try_join!(child.wait(), stdout, stderr)
}

async fn drain<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
