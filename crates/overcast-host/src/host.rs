//! The host capability contract shared by every provisioning strategy.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// A machine a test can talk to.
///
/// A host is bound to one VM for one test run: call [`setup`](Host::setup)
/// once before use and [`teardown`](Host::teardown) once afterwards. Both
/// fail hard; a host that failed to set up must not be used.
#[async_trait]
pub trait Host: Send + Sync {
    /// Make the machine available.
    async fn setup(&mut self) -> Result<()>;

    /// Release the machine.
    async fn teardown(&mut self) -> Result<()>;

    /// Address tests should connect to.
    fn host_name(&self) -> &str;

    /// Port on [`host_name`](Host::host_name) that reaches `port` on the guest.
    fn port(&self, port: u16) -> u16;
}

/// What `vagrant status` says about a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmStatus {
    /// The machine does not exist yet.
    NotCreated,
    /// The machine exists and is up.
    Running,
    /// The machine exists but is not running (powered off, saved, aborted).
    Stopped,
}

impl VmStatus {
    /// Interpret the free text printed by `vagrant status`.
    ///
    /// "not created" anywhere means the machine does not exist. Otherwise the
    /// state is read from the `<name> <state> (<provider>)` line only, so a
    /// machine name cannot be mistaken for its state.
    pub fn from_output(output: &str) -> Self {
        if output.contains("not created") {
            return Self::NotCreated;
        }
        match machine_state(output) {
            Some("running") => Self::Running,
            _ => Self::Stopped,
        }
    }

    /// Whether the machine has been created.
    pub fn exists(&self) -> bool {
        *self != Self::NotCreated
    }
}

/// State column of the first `<name> <state> (<provider>)` line.
fn machine_state(output: &str) -> Option<&str> {
    output.lines().find_map(|line| {
        let (head, provider) = line.trim().rsplit_once(" (")?;
        if !provider.ends_with(')') {
            return None;
        }
        let (_name, state) = head.split_once(char::is_whitespace)?;
        Some(state.trim())
    })
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCreated => write!(f, "not created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
