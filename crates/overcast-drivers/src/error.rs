//! Error types for overcast-drivers.

use thiserror::Error;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur while driving Vagrant or VirtualBox.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The CLI could not be run or exited nonzero.
    #[error(transparent)]
    Command(#[from] overcast_command::CommandError),

    /// The CLI succeeded but printed something we cannot interpret.
    #[error("unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput {
        /// Command line that produced the output
        command: String,
        /// Raw stdout
        output: String,
    },
}
