//! # overcast-host
//!
//! Vagrant/VirtualBox machines for integration tests, behind one [`Host`]
//! contract.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     overcast-host                        │
//! │                                                          │
//! │  ┌──────────────┐      ┌──────────────────────────────┐  │
//! │  │  BasicHost   │      │         CachedHost           │  │
//! │  │  up/destroy  │      │  fingerprint ─▶ tag ─▶ reuse │  │
//! │  └──────┬───────┘      └───────┬──────────────┬───────┘  │
//! └─────────┼──────────────────────┼──────────────┼──────────┘
//!           ▼                      ▼              ▼
//! ┌──────────────────────────────────────┐ ┌─────────────────┐
//! │ overcast-drivers: VagrantDriver      │ │ VirtualBoxDriver│
//! └──────────────────┬───────────────────┘ └────────┬────────┘
//!                    ▼                               ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ overcast-command: ProcessRunner (spawn, drain, exit code)│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use overcast_host::{host_from_config, OvercastConfig};
//!
//! # async fn example() -> overcast_host::Result<()> {
//! let config = OvercastConfig::load()?;
//! let mut host = host_from_config(&config, "web")?;
//!
//! host.setup().await?;
//! println!("connect to {}:{}", host.host_name(), host.port(8080));
//! host.teardown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Caching
//!
//! A [`CachedHost`] runs a fingerprint command (e.g. `git rev-parse HEAD`)
//! and stamps its output into the VM's VirtualBox extra-data under
//! [`EXPIRATION_TAG_PROPERTY_KEY`] right after `vagrant up` succeeds.
//! Teardown powers a tagged VM off instead of destroying it, so the next run
//! boots it in seconds. [`ExistingVmPolicy`] decides what happens when the
//! tag no longer matches.

mod basic;
mod cached;
mod config;
mod error;
mod factory;
mod host;

pub use basic::BasicHost;
pub use cached::{CachedHost, ExistingVmPolicy, EXPIRATION_TAG_PROPERTY_KEY};
pub use config::{default_paths, HostConfig, HostKind, OvercastConfig, CONFIG_FILE_NAME};
pub use error::{ConfigError, HostError, Result};
pub use factory::host_from_config;
pub use host::{Host, VmStatus};
