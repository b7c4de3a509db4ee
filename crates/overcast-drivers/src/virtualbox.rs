//! VirtualBox (`VBoxManage`) driver.

use crate::error::{DriverError, Result};
use async_trait::async_trait;
use overcast_command::{Command, CommandProcessor, CommandResponse};
use std::sync::Arc;

/// Default VirtualBox management executable, resolved through `PATH`.
pub const VBOXMANAGE_EXECUTABLE: &str = "VBoxManage";

const VALUE_PREFIX: &str = "Value: ";
const NO_VALUE: &str = "No value set!";

/// Operations on a hypervisor, addressed by VM name or UUID.
#[async_trait]
pub trait HypervisorDriver: Send + Sync {
    /// Read a named property from the VM's metadata. `None` when unset.
    async fn get_extra_data(&self, vm: &str, key: &str) -> Result<Option<String>>;

    /// Write a named property into the VM's metadata.
    async fn set_extra_data(&self, vm: &str, key: &str, value: &str) -> Result<()>;

    /// Hard power-off, keeping the VM and its disks.
    async fn power_off(&self, vm: &str) -> Result<()>;

    /// Boot a powered-off VM without a GUI.
    async fn start(&self, vm: &str) -> Result<()>;
}

/// [`HypervisorDriver`] that shells out to `VBoxManage`.
#[derive(Clone)]
pub struct VirtualBoxDriver {
    executable: String,
    processor: Arc<dyn CommandProcessor>,
}

impl std::fmt::Debug for VirtualBoxDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualBoxDriver")
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}

impl VirtualBoxDriver {
    pub fn new(processor: Arc<dyn CommandProcessor>) -> Self {
        Self {
            executable: VBOXMANAGE_EXECUTABLE.to_string(),
            processor,
        }
    }

    /// Use a different `VBoxManage` binary.
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    async fn vboxmanage(&self, args: &[&str]) -> Result<CommandResponse> {
        let command = Command::new(&self.executable).args(args.iter().copied());
        Ok(self.processor.run(&command).await?)
    }
}

#[async_trait]
impl HypervisorDriver for VirtualBoxDriver {
    async fn get_extra_data(&self, vm: &str, key: &str) -> Result<Option<String>> {
        let response = self.vboxmanage(&["getextradata", vm, key]).await?;
        let value =
            parse_extra_data(&response.stdout).ok_or_else(|| DriverError::UnexpectedOutput {
                command: format!("{} getextradata {} {}", self.executable, vm, key),
                output: response.stdout.clone(),
            })?;
        tracing::debug!(vm, key, value = ?value, "read extra data");
        Ok(value)
    }

    async fn set_extra_data(&self, vm: &str, key: &str, value: &str) -> Result<()> {
        tracing::debug!(vm, key, value, "writing extra data");
        self.vboxmanage(&["setextradata", vm, key, value]).await?;
        Ok(())
    }

    async fn power_off(&self, vm: &str) -> Result<()> {
        tracing::debug!(vm, "powering off");
        self.vboxmanage(&["controlvm", vm, "poweroff"]).await?;
        Ok(())
    }

    async fn start(&self, vm: &str) -> Result<()> {
        tracing::debug!(vm, "starting headless");
        self.vboxmanage(&["startvm", vm, "--type", "headless"]).await?;
        Ok(())
    }
}

/// Interpret `getextradata` output: `Some(Some(v))` for a value,
/// `Some(None)` when unset, `None` when unrecognised.
fn parse_extra_data(stdout: &str) -> Option<Option<String>> {
    for line in stdout.lines() {
        let line = line.trim_end();
        if let Some(value) = line.strip_prefix(VALUE_PREFIX) {
            return Some(Some(value.to_string()));
        }
        if line == NO_VALUE {
            return Some(None);
        }
    }
    None
}
