//! Host configuration.
//!
//! Configuration is read from layered TOML files, later files overriding
//! earlier ones key by key:
//!
//! | Layer | Path |
//! |-------|------|
//! | user | `~/.overcast/overcast.toml` |
//! | project | `./overcast.toml` |
//!
//! `${env.NAME}` anywhere in a file is replaced with the value of the
//! environment variable `NAME` before parsing. Unknown variables are left
//! verbatim.
//!
//! ```toml
//! [hosts.web]
//! vagrant_dir = "/srv/vms/web"
//! vagrant_vm = "web"
//! vagrant_ip = "192.168.33.10"
//! expiration_tag_cmd = "git rev-parse HEAD"
//! existing_vm_policy = "refresh"
//! ```

use crate::cached::ExistingVmPolicy;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Name of the configuration file looked up in each layer.
pub const CONFIG_FILE_NAME: &str = "overcast.toml";

const ENV_PLACEHOLDER: &str = "${env.";

/// All configured hosts, by label.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OvercastConfig {
    #[serde(default)]
    pub hosts: BTreeMap<String, HostConfig>,
}

/// Settings for one host label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Vagrant project directory (required).
    pub vagrant_dir: Option<PathBuf>,
    /// Vagrant machine name; required for cached hosts.
    pub vagrant_vm: Option<String>,
    /// Static address tests connect to (required).
    pub vagrant_ip: Option<String>,
    /// Command printing the current fingerprint. Its presence makes the host cached.
    pub expiration_tag_cmd: Option<String>,
    /// What a cached host does with an existing VM whose tag is stale.
    #[serde(default)]
    pub existing_vm_policy: ExistingVmPolicy,
    /// Kill external commands running longer than this (default: wait forever).
    pub command_timeout_secs: Option<u64>,
    /// Override for the `vagrant` binary.
    pub vagrant_executable: Option<String>,
    /// Override for the `VBoxManage` binary.
    pub vboxmanage_executable: Option<String>,
}

/// Which host implementation a label resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Basic,
    Cached,
}

impl HostConfig {
    pub fn kind(&self) -> HostKind {
        if self.expiration_tag_cmd.is_some() {
            HostKind::Cached
        } else {
            HostKind::Basic
        }
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Check that everything the host kind needs is present.
    pub fn validate(&self, label: &str) -> Result<(), ConfigError> {
        let missing = |property| ConfigError::MissingProperty {
            label: label.to_string(),
            property,
        };
        if self.vagrant_dir.is_none() {
            return Err(missing("vagrant_dir"));
        }
        if self.vagrant_ip.is_none() {
            return Err(missing("vagrant_ip"));
        }
        if self.kind() == HostKind::Cached && self.vagrant_vm.is_none() {
            return Err(missing("vagrant_vm"));
        }
        Ok(())
    }
}

impl OvercastConfig {
    /// Load from the default layers (user, then project).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_paths())
    }

    /// Load and merge the given files in order. Missing files are skipped.
    pub fn load_from<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut merged = toml::Table::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                tracing::warn!(path = %path.display(), "Configuration file not found");
                continue;
            }
            tracing::info!(path = %path.display(), "Loading configuration");
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let layer: toml::Table = substitute_env(&text)
                .parse()
                .map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            merge(&mut merged, layer);
        }
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Look up a host by label.
    pub fn host(&self, label: &str) -> Result<&HostConfig, ConfigError> {
        self.hosts
            .get(label)
            .ok_or_else(|| ConfigError::UnknownHost(label.to_string()))
    }
}

impl FromStr for OvercastConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(&substitute_env(s))?)
    }
}

/// The user and project configuration files, in load order.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".overcast").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Replace `${env.NAME}` placeholders with environment values.
fn substitute_env(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(ENV_PLACEHOLDER) {
        out.push_str(&rest[..start]);
        let after = &rest[start + ENV_PLACEHOLDER.len()..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        match std::env::var(&after[..end]) {
            Ok(value) => out.push_str(&value),
            Err(_) => out.push_str(&rest[start..start + ENV_PLACEHOLDER.len() + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Deep-merge `overlay` into `base`; scalar values in `overlay` win.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
