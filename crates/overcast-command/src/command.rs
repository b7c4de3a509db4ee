//! Command and CommandResponse value types.

use crate::error::{CommandError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// An external process invocation.
///
/// Commands are immutable and replayable: the same `Command` can be handed to
/// a [`CommandProcessor`](crate::CommandProcessor) any number of times.
///
/// # Example
///
/// ```
/// use overcast_command::Command;
///
/// let cmd = Command::new("vagrant")
///     .arg("destroy")
///     .arg("-f")
///     .current_dir("/srv/vms/web");
/// assert_eq!(cmd.to_string(), "vagrant destroy -f");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    executable: String,
    arguments: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl Command {
    /// Create a command for the given executable with no arguments.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
            working_dir: None,
        }
    }

    /// Parse a whitespace-separated command line.
    ///
    /// The first token is the executable, the rest are arguments. No shell
    /// quoting is interpreted.
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let executable = tokens
            .next()
            .ok_or_else(|| CommandError::InvalidCommand(line.to_string()))?;
        Ok(Self::new(executable).args(tokens))
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append several arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory the process is started in.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of running a [`Command`] to completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResponse {
    /// Process exit code (-1 when terminated by a signal).
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandResponse {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Exit code zero is the only success signal.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
