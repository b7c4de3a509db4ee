//! Vagrant CLI driver.

use crate::error::Result;
use async_trait::async_trait;
use overcast_command::{Command, CommandProcessor, CommandResponse};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default Vagrant executable, resolved through `PATH`.
pub const VAGRANT_EXECUTABLE: &str = "vagrant";

/// Operations on a VM-orchestration tool.
///
/// The driver does not interpret output; callers decide what a status line
/// means. Nonzero exits surface as errors from the underlying processor.
#[async_trait]
pub trait OrchestratorDriver: Send + Sync {
    /// Run `status` for the project, optionally scoped to one machine.
    async fn status(&self, vm: Option<&str>) -> Result<CommandResponse>;

    /// Run an arbitrary subcommand (`up`, `destroy -f`, ...).
    async fn apply(
        &self,
        vm: Option<&str>,
        subcommand: &str,
        args: &[&str],
    ) -> Result<CommandResponse>;
}

/// [`OrchestratorDriver`] that shells out to `vagrant` in a project directory.
///
/// Every invocation runs with the project directory as working directory and
/// gets the machine name, when given, appended as the last argument.
#[derive(Clone)]
pub struct VagrantDriver {
    vagrant_dir: PathBuf,
    executable: String,
    processor: Arc<dyn CommandProcessor>,
}

impl std::fmt::Debug for VagrantDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VagrantDriver")
            .field("vagrant_dir", &self.vagrant_dir)
            .field("executable", &self.executable)
            .finish_non_exhaustive()
    }
}

impl VagrantDriver {
    /// Create a driver for the Vagrant project in `vagrant_dir`.
    pub fn new(vagrant_dir: impl Into<PathBuf>, processor: Arc<dyn CommandProcessor>) -> Self {
        Self {
            vagrant_dir: vagrant_dir.into(),
            executable: VAGRANT_EXECUTABLE.to_string(),
            processor,
        }
    }

    /// Use a different `vagrant` binary.
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn vagrant_dir(&self) -> &Path {
        &self.vagrant_dir
    }

    fn command(&self, vm: Option<&str>, subcommand: &str, args: &[&str]) -> Command {
        Command::new(&self.executable)
            .arg(subcommand)
            .args(args.iter().copied())
            .args(vm)
            .current_dir(&self.vagrant_dir)
    }
}

#[async_trait]
impl OrchestratorDriver for VagrantDriver {
    async fn status(&self, vm: Option<&str>) -> Result<CommandResponse> {
        self.apply(vm, "status", &[]).await
    }

    async fn apply(
        &self,
        vm: Option<&str>,
        subcommand: &str,
        args: &[&str],
    ) -> Result<CommandResponse> {
        let command = self.command(vm, subcommand, args);
        tracing::debug!(vm = ?vm, subcommand, "vagrant");
        Ok(self.processor.run(&command).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingProcessor;
    use crate::DriverError;
    use overcast_command::CommandError;

    #[tokio::test]
    async fn test_status_appends_vm_and_sets_dir() {
        let processor = RecordingProcessor::replying(CommandResponse::new(
            0,
            "default                   not created (virtualbox)",
            "",
        ));
        let driver = VagrantDriver::new("/srv/vms", processor.clone());

        let response = driver.status(Some("myvm")).await.unwrap();
        assert!(response.stdout.contains("not created"));

        let commands = processor.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].to_string(), "vagrant status myvm");
        assert_eq!(commands[0].working_dir(), Some(Path::new("/srv/vms")));
    }

    #[tokio::test]
    async fn test_apply_without_vm() {
        let processor = RecordingProcessor::replying(CommandResponse::default());
        let driver = VagrantDriver::new("/srv/vms", processor.clone());

        driver.apply(None, "up", &[]).await.unwrap();
        assert_eq!(processor.commands()[0].to_string(), "vagrant up");
    }

    #[tokio::test]
    async fn test_destroy_puts_vm_after_flags() {
        let processor = RecordingProcessor::replying(CommandResponse::default());
        let driver = VagrantDriver::new("/srv/vms", processor.clone())
            .with_executable("/opt/vagrant/bin/vagrant");

        driver.apply(Some("myvm"), "destroy", &["-f"]).await.unwrap();
        assert_eq!(
            processor.commands()[0].to_string(),
            "/opt/vagrant/bin/vagrant destroy -f myvm"
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_propagates() {
        let processor =
            RecordingProcessor::replying(CommandResponse::new(1, "", "Vagrantfile missing"));
        let driver = VagrantDriver::new("/srv/vms", processor);

        let err = driver.apply(Some("myvm"), "up", &[]).await.unwrap_err();
        match err {
            DriverError::Command(CommandError::NonZeroExit { response, .. }) => {
                assert_eq!(response.exit_code, 1);
                assert_eq!(response.stderr, "Vagrantfile missing");
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
    }
}
