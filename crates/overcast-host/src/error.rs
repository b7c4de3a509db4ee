//! Error types for overcast-host.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can occur while setting up or tearing down a host.
#[derive(Debug, Error)]
pub enum HostError {
    /// A command run directly by the host failed (e.g. the fingerprint command).
    #[error("command failed: {0}")]
    Command(#[from] overcast_command::CommandError),

    /// A Vagrant or VirtualBox invocation failed.
    #[error("driver failed: {0}")]
    Driver(#[from] overcast_drivers::DriverError),

    /// The host could not be built from configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The fingerprint command succeeded but printed nothing.
    #[error("fingerprint command `{command}` printed no fingerprint")]
    EmptyFingerprint {
        /// Fingerprint command that was run
        command: overcast_command::Command,
    },

    /// An existing VM carries a different tag and the policy says not to guess.
    #[error(
        "VM {vm} already exists with expiration tag {found:?} but {expected:?} is wanted; \
         set existing_vm_policy to \"reuse\" or \"refresh\" to decide"
    )]
    UndefinedPolicy {
        /// VM name
        vm: String,
        /// Current fingerprint
        expected: String,
        /// Tag found on the VM
        found: Option<String>,
    },
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML.
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// TOML syntax error
        #[source]
        source: toml::de::Error,
    },

    /// The merged configuration does not match the expected schema.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),

    /// No `[hosts.<label>]` table for the requested label.
    #[error("no host labelled {0:?} is configured")]
    UnknownHost(String),

    /// A host lacks a property its kind requires.
    #[error("host {label:?} is missing required property {property}")]
    MissingProperty {
        /// Host label
        label: String,
        /// Name of the missing key
        property: &'static str,
    },

    /// `expiration_tag_cmd` does not name an executable.
    #[error("host {label:?} has an invalid expiration_tag_cmd: {source}")]
    InvalidCommand {
        /// Host label
        label: String,
        /// Parse failure
        #[source]
        source: overcast_command::CommandError,
    },
}
