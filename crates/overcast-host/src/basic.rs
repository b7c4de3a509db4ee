//! Uncached Vagrant host.

use crate::error::Result;
use crate::host::{Host, VmStatus};
use async_trait::async_trait;
use overcast_drivers::OrchestratorDriver;
use std::sync::Arc;

/// Host that ups a Vagrant machine for the test and destroys it afterwards.
///
/// A machine that already existed before [`setup`](Host::setup) belongs to
/// whoever created it: it is used as-is and left alone on teardown.
pub struct BasicHost {
    label: String,
    vm: Option<String>,
    address: String,
    vagrant: Arc<dyn OrchestratorDriver>,
    created_before_setup: bool,
}

impl BasicHost {
    /// Create a host.
    ///
    /// `vm` is the Vagrant machine name for multi-machine projects, `None`
    /// for the project's only machine.
    pub fn new(
        label: impl Into<String>,
        vm: Option<String>,
        address: impl Into<String>,
        vagrant: Arc<dyn OrchestratorDriver>,
    ) -> Self {
        Self {
            label: label.into(),
            vm,
            address: address.into(),
            vagrant,
            created_before_setup: false,
        }
    }

    /// Configuration label of this host.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether setup found the machine already created.
    pub fn created_before_setup(&self) -> bool {
        self.created_before_setup
    }
}

#[async_trait]
impl Host for BasicHost {
    async fn setup(&mut self) -> Result<()> {
        let vm = self.vm.as_deref();
        let response = self.vagrant.status(vm).await?;
        let status = VmStatus::from_output(&response.stdout);
        self.created_before_setup = status.exists();

        if self.created_before_setup {
            tracing::info!(host = %self.label, %status, "Vagrant host already created, not upping it");
            return Ok(());
        }

        tracing::info!(host = %self.label, "Upping Vagrant host");
        self.vagrant.apply(vm, "up", &[]).await?;
        Ok(())
    }

    async fn teardown(&mut self) -> Result<()> {
        if self.created_before_setup {
            tracing::info!(
                host = %self.label,
                "Vagrant host existed before the test started, not destroying it"
            );
            return Ok(());
        }

        tracing::info!(host = %self.label, "Destroying Vagrant host");
        self.vagrant.apply(self.vm.as_deref(), "destroy", &["-f"]).await?;
        Ok(())
    }

    fn host_name(&self) -> &str {
        &self.address
    }

    fn port(&self, port: u16) -> u16 {
        port
    }
}
