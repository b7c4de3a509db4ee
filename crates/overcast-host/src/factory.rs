//! Building hosts from configuration.

use crate::basic::BasicHost;
use crate::cached::CachedHost;
use crate::config::OvercastConfig;
use crate::error::{ConfigError, Result};
use crate::host::Host;
use overcast_command::{Command, CommandProcessor, ProcessRunner};
use overcast_drivers::{VagrantDriver, VirtualBoxDriver};
use std::sync::Arc;

/// Build the host configured under `label`.
///
/// Hosts with an `expiration_tag_cmd` become a [`CachedHost`], all others a
/// [`BasicHost`]. Both share one [`ProcessRunner`].
pub fn host_from_config(config: &OvercastConfig, label: &str) -> Result<Box<dyn Host>> {
    let settings = config.host(label)?;
    settings.validate(label)?;

    let missing = |property| ConfigError::MissingProperty {
        label: label.to_string(),
        property,
    };
    let vagrant_dir = settings.vagrant_dir.clone().ok_or_else(|| missing("vagrant_dir"))?;
    let address = settings.vagrant_ip.clone().ok_or_else(|| missing("vagrant_ip"))?;

    let mut runner = ProcessRunner::new();
    if let Some(timeout) = settings.command_timeout() {
        runner = runner.with_timeout(timeout);
    }
    let processor: Arc<dyn CommandProcessor> = Arc::new(runner);

    let mut vagrant = VagrantDriver::new(vagrant_dir, processor.clone());
    if let Some(executable) = &settings.vagrant_executable {
        vagrant = vagrant.with_executable(executable);
    }

    tracing::debug!(host = %label, kind = ?settings.kind(), "Building host");
    match &settings.expiration_tag_cmd {
        Some(line) => {
            let vm = settings.vagrant_vm.clone().ok_or_else(|| missing("vagrant_vm"))?;
            let fingerprint_command =
                Command::parse(line).map_err(|source| ConfigError::InvalidCommand {
                    label: label.to_string(),
                    source,
                })?;

            let mut virtualbox = VirtualBoxDriver::new(processor.clone());
            if let Some(executable) = &settings.vboxmanage_executable {
                virtualbox = virtualbox.with_executable(executable);
            }

            let host = CachedHost::new(
                vm,
                address,
                fingerprint_command,
                Arc::new(vagrant),
                Arc::new(virtualbox),
                processor,
            )
            .with_policy(settings.existing_vm_policy);
            Ok(Box::new(host))
        }
        None => Ok(Box::new(BasicHost::new(
            label,
            settings.vagrant_vm.clone(),
            address,
            Arc::new(vagrant),
        ))),
    }
}
