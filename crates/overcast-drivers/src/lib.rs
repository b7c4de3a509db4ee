//! # overcast-drivers
//!
//! Thin wrappers translating VM lifecycle operations into Vagrant and
//! VirtualBox command lines.
//!
//! - [`OrchestratorDriver`] / [`VagrantDriver`]: `status`, `up`, `destroy -f`
//!   and friends, run inside a Vagrant project directory.
//! - [`HypervisorDriver`] / [`VirtualBoxDriver`]: VM extra-data (the
//!   expiration tag lives there), power-off and headless start.
//!
//! Both drivers delegate execution and exit-code classification to an
//! [`overcast_command::CommandProcessor`].
//!
//! ```no_run
//! use overcast_command::ProcessRunner;
//! use overcast_drivers::{HypervisorDriver, OrchestratorDriver, VagrantDriver, VirtualBoxDriver};
//! use std::sync::Arc;
//!
//! # async fn example() -> overcast_drivers::Result<()> {
//! let runner = Arc::new(ProcessRunner::new());
//! let vagrant = VagrantDriver::new("/srv/vms/web", runner.clone());
//! let vbox = VirtualBoxDriver::new(runner);
//!
//! vagrant.apply(Some("web"), "up", &[]).await?;
//! vbox.set_extra_data("web", "overcast.expirationTag", "abc123").await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod vagrant;
mod virtualbox;

#[cfg(test)]
mod testing;

pub use error::{DriverError, Result};
pub use vagrant::{OrchestratorDriver, VagrantDriver, VAGRANT_EXECUTABLE};
pub use virtualbox::{HypervisorDriver, VirtualBoxDriver, VBOXMANAGE_EXECUTABLE};
