//! Vagrant host cached across test runs, keyed by a content fingerprint.
//!
//! The fingerprint (typically a source revision) is printed by a configured
//! command and stamped into the VM's VirtualBox extra-data once the VM is up.
//! Teardown only powers off a tagged VM so the next run can boot it again;
//! an untagged VM is destroyed.
//!
//! ```text
//!   Uncached ──setup: up, then tag──▶ Cached(T) ──teardown──▶ PoweredOff(T)
//!      │                                                         │
//!      └──teardown (no tag): destroy -f ──▶ Destroyed            │
//!                                                                ▼
//!                                           setup: status exists, tag == T
//!                                           ──▶ start (no `vagrant up`)
//! ```

use crate::error::{HostError, Result};
use crate::host::{Host, VmStatus};
use async_trait::async_trait;
use overcast_command::{Command, CommandProcessor};
use overcast_drivers::{HypervisorDriver, OrchestratorDriver};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// VirtualBox extra-data key holding the fingerprint a VM was provisioned for.
pub const EXPIRATION_TAG_PROPERTY_KEY: &str = "overcast.expirationTag";

/// What to do when a VM already exists but its tag does not match the
/// current fingerprint (or it has no tag at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingVmPolicy {
    /// Boot the existing VM as it is and leave its tag untouched.
    #[default]
    Reuse,
    /// Destroy the VM, up a fresh one and tag it with the current fingerprint.
    Refresh,
    /// Refuse with [`HostError::UndefinedPolicy`].
    Fail,
}

impl fmt::Display for ExistingVmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reuse"),
            Self::Refresh => write!(f, "refresh"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Host whose VM survives teardown while its expiration tag is set.
///
/// One instance serves one VM name for one run and is driven sequentially.
/// Two processes sharing a VM name race between reading and writing the tag.
///
/// Teardown is not idempotent: without a tag every call runs `destroy -f`.
pub struct CachedHost {
    vm_name: String,
    vm_address: String,
    fingerprint_command: Command,
    policy: ExistingVmPolicy,
    vagrant: Arc<dyn OrchestratorDriver>,
    virtualbox: Arc<dyn HypervisorDriver>,
    processor: Arc<dyn CommandProcessor>,
}

impl CachedHost {
    /// Create a host with the default [`ExistingVmPolicy::Reuse`] policy.
    pub fn new(
        vm_name: impl Into<String>,
        vm_address: impl Into<String>,
        fingerprint_command: Command,
        vagrant: Arc<dyn OrchestratorDriver>,
        virtualbox: Arc<dyn HypervisorDriver>,
        processor: Arc<dyn CommandProcessor>,
    ) -> Self {
        Self {
            vm_name: vm_name.into(),
            vm_address: vm_address.into(),
            fingerprint_command,
            policy: ExistingVmPolicy::default(),
            vagrant,
            virtualbox,
            processor,
        }
    }

    /// Set the policy for an existing VM with a stale or missing tag.
    pub fn with_policy(mut self, policy: ExistingVmPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// VirtualBox name of the cached VM.
    pub fn vm_name(&self) -> &str {
        &self.vm_name
    }

    /// Policy applied to an existing VM with a stale or missing tag.
    pub fn policy(&self) -> ExistingVmPolicy {
        self.policy
    }

    /// Run the fingerprint command. Blank output is an error: VirtualBox
    /// treats an empty extra-data value as a deletion.
    async fn fingerprint(&self) -> Result<String> {
        let response = self.processor.run(&self.fingerprint_command).await?;
        let fingerprint = response.stdout.trim();
        if fingerprint.is_empty() {
            return Err(HostError::EmptyFingerprint {
                command: self.fingerprint_command.clone(),
            });
        }
        Ok(fingerprint.to_string())
    }

    async fn read_tag(&self) -> Result<Option<String>> {
        Ok(self
            .virtualbox
            .get_extra_data(&self.vm_name, EXPIRATION_TAG_PROPERTY_KEY)
            .await?)
    }

    /// `vagrant up`, then stamp the tag. The tag is only written once the VM
    /// provably exists.
    async fn up_and_tag(&self, fingerprint: &str) -> Result<()> {
        tracing::info!(vm = %self.vm_name, "Upping Vagrant host");
        self.vagrant.apply(Some(self.vm_name.as_str()), "up", &[]).await?;

        tracing::info!(vm = %self.vm_name, tag = %fingerprint, "Tagging VM");
        self.virtualbox
            .set_extra_data(&self.vm_name, EXPIRATION_TAG_PROPERTY_KEY, fingerprint)
            .await?;
        Ok(())
    }

    async fn boot(&self, status: VmStatus) -> Result<()> {
        if status == VmStatus::Running {
            tracing::info!(vm = %self.vm_name, "VM already running");
            return Ok(());
        }
        tracing::info!(vm = %self.vm_name, %status, "Booting cached VM");
        self.virtualbox.start(&self.vm_name).await?;
        Ok(())
    }

    async fn setup_existing(&self, status: VmStatus, fingerprint: String) -> Result<()> {
        let tag = self.read_tag().await?;
        if tag.as_deref() == Some(fingerprint.as_str()) {
            tracing::info!(vm = %self.vm_name, tag = %fingerprint, "Cached VM is up to date");
            return self.boot(status).await;
        }

        match self.policy {
            ExistingVmPolicy::Reuse => {
                tracing::warn!(
                    vm = %self.vm_name,
                    expected = %fingerprint,
                    found = ?tag,
                    "Cached VM tag does not match, reusing it as is"
                );
                self.boot(status).await
            }
            ExistingVmPolicy::Refresh => {
                tracing::info!(
                    vm = %self.vm_name,
                    expected = %fingerprint,
                    found = ?tag,
                    "Cached VM expired, recreating it"
                );
                self.vagrant
                    .apply(Some(self.vm_name.as_str()), "destroy", &["-f"])
                    .await?;
                self.up_and_tag(&fingerprint).await
            }
            ExistingVmPolicy::Fail => Err(HostError::UndefinedPolicy {
                vm: self.vm_name.clone(),
                expected: fingerprint,
                found: tag,
            }),
        }
    }
}

#[async_trait]
impl Host for CachedHost {
    async fn setup(&mut self) -> Result<()> {
        let fingerprint = self.fingerprint().await?;
        tracing::debug!(vm = %self.vm_name, %fingerprint, "Computed fingerprint");

        let response = self.vagrant.status(Some(self.vm_name.as_str())).await?;
        let status = VmStatus::from_output(&response.stdout);

        if status.exists() {
            self.setup_existing(status, fingerprint).await
        } else {
            self.up_and_tag(&fingerprint).await
        }
    }

    async fn teardown(&mut self) -> Result<()> {
        match self.read_tag().await? {
            Some(tag) => {
                tracing::info!(vm = %self.vm_name, %tag, "Powering off cached VM");
                self.virtualbox.power_off(&self.vm_name).await?;
            }
            None => {
                tracing::info!(vm = %self.vm_name, "VM has no expiration tag, destroying it");
                self.vagrant
                    .apply(Some(self.vm_name.as_str()), "destroy", &["-f"])
                    .await?;
            }
        }
        Ok(())
    }

    fn host_name(&self) -> &str {
        &self.vm_address
    }

    fn port(&self, port: u16) -> u16 {
        port
    }
}
