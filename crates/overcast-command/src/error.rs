//! Error types for overcast-command.

use crate::{Command, CommandResponse};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("cannot execute `{command}`: {source}")]
    Execution {
        /// Command that failed to start
        command: Command,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a nonzero code.
    #[error("`{command}` exited with code {}: {}", .response.exit_code, .response.stderr.trim())]
    NonZeroExit {
        /// Command that was run
        command: Command,
        /// Full captured response
        response: CommandResponse,
    },

    /// The process outlived the configured timeout and was killed.
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout {
        /// Command that was run
        command: Command,
        /// Configured limit
        timeout: Duration,
    },

    /// A command line with no executable.
    #[error("invalid command line: {0:?}")]
    InvalidCommand(String),
}

impl CommandError {
    /// The response of a command that ran and failed, if that is what happened.
    pub fn response(&self) -> Option<&CommandResponse> {
        match self {
            Self::NonZeroExit { response, .. } => Some(response),
            _ => None,
        }
    }
}
