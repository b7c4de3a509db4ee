#![allow(dead_code)]

//! Recording fakes for the Vagrant/VirtualBox drivers and the command processor.
//!
//! All fakes append to one shared call log so tests can assert the relative
//! order of calls across collaborators.

use async_trait::async_trait;
use overcast_command::{Command, CommandError, CommandProcessor, CommandResponse};
use overcast_drivers::{DriverError, HypervisorDriver, OrchestratorDriver};
use overcast_host::{CachedHost, ExistingVmPolicy};
use std::sync::{Arc, Mutex};

pub const VM: &str = "myvm";
pub const VM_ADDRESS: &str = "127.0.0.1";
pub const SOME_SHA: &str = "ef65erfds-i-am-git-SHA-bk34hg";
pub const SOME_OTHER_SHA: &str = "uygw4-i-am-git-SHA-k34h";

pub const NOT_CREATED: &str = "Current machine states:\n\nmyvm                      not created (virtualbox)\n";
pub const POWEROFF: &str = "Current machine states:\n\nmyvm                      poweroff (virtualbox)\n";
pub const RUNNING: &str = "Current machine states:\n\nmyvm                      running (virtualbox)\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fingerprint,
    Status(Option<String>),
    Apply(Option<String>, Vec<String>),
    GetTag(String, String),
    SetTag(String, String, String),
    PowerOff(String),
    Start(String),
}

impl Call {
    pub fn apply(vm: &str, words: &[&str]) -> Self {
        Call::Apply(Some(vm.to_string()), words.iter().map(|w| w.to_string()).collect())
    }

    pub fn is_orchestrator(&self) -> bool {
        matches!(self, Call::Status(_) | Call::Apply(..))
    }
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn failure(command: Command, exit_code: i32, stderr: &str) -> CommandError {
    CommandError::NonZeroExit {
        command,
        response: CommandResponse::new(exit_code, "", stderr),
    }
}

pub struct FakeVagrant {
    log: CallLog,
    status_output: String,
    failing_subcommand: Mutex<Option<String>>,
}

impl FakeVagrant {
    pub fn fail_on(&self, subcommand: &str) {
        *self.failing_subcommand.lock().unwrap() = Some(subcommand.to_string());
    }
}

#[async_trait]
impl OrchestratorDriver for FakeVagrant {
    async fn status(&self, vm: Option<&str>) -> overcast_drivers::Result<CommandResponse> {
        self.log.lock().unwrap().push(Call::Status(vm.map(String::from)));
        Ok(CommandResponse::new(0, self.status_output.clone(), ""))
    }

    async fn apply(
        &self,
        vm: Option<&str>,
        subcommand: &str,
        args: &[&str],
    ) -> overcast_drivers::Result<CommandResponse> {
        let mut words = vec![subcommand.to_string()];
        words.extend(args.iter().map(|a| a.to_string()));
        self.log
            .lock()
            .unwrap()
            .push(Call::Apply(vm.map(String::from), words));

        if self.failing_subcommand.lock().unwrap().as_deref() == Some(subcommand) {
            let command = Command::new("vagrant").arg(subcommand).args(vm);
            return Err(DriverError::Command(failure(command, 1, "vagrant exploded")));
        }
        Ok(CommandResponse::default())
    }
}

/// Keeps the tag in memory so a later teardown sees what setup stamped.
pub struct FakeVirtualBox {
    log: CallLog,
    tag: Mutex<Option<String>>,
    failing_operation: Mutex<Option<String>>,
}

impl FakeVirtualBox {
    pub fn tag(&self) -> Option<String> {
        self.tag.lock().unwrap().clone()
    }

    /// Make the `VBoxManage` subcommand `operation` (`getextradata`,
    /// `setextradata`, `controlvm` or `startvm`) exit with code 1.
    pub fn fail_on(&self, operation: &str) {
        *self.failing_operation.lock().unwrap() = Some(operation.to_string());
    }

    fn check(&self, operation: &str, vm: &str) -> overcast_drivers::Result<()> {
        if self.failing_operation.lock().unwrap().as_deref() == Some(operation) {
            let command = Command::new("VBoxManage").arg(operation).arg(vm);
            return Err(DriverError::Command(failure(command, 1, "VBOX_E_OBJECT_NOT_FOUND")));
        }
        Ok(())
    }
}

#[async_trait]
impl HypervisorDriver for FakeVirtualBox {
    async fn get_extra_data(&self, vm: &str, key: &str) -> overcast_drivers::Result<Option<String>> {
        self.log
            .lock()
            .unwrap()
            .push(Call::GetTag(vm.to_string(), key.to_string()));
        self.check("getextradata", vm)?;
        Ok(self.tag())
    }

    async fn set_extra_data(&self, vm: &str, key: &str, value: &str) -> overcast_drivers::Result<()> {
        self.log.lock().unwrap().push(Call::SetTag(
            vm.to_string(),
            key.to_string(),
            value.to_string(),
        ));
        self.check("setextradata", vm)?;
        *self.tag.lock().unwrap() = Some(value.to_string());
        Ok(())
    }

    async fn power_off(&self, vm: &str) -> overcast_drivers::Result<()> {
        self.log.lock().unwrap().push(Call::PowerOff(vm.to_string()));
        self.check("controlvm", vm)
    }

    async fn start(&self, vm: &str) -> overcast_drivers::Result<()> {
        self.log.lock().unwrap().push(Call::Start(vm.to_string()));
        self.check("startvm", vm)
    }
}

/// Answers the fingerprint command.
pub struct FakeProcessor {
    log: CallLog,
    reply: CommandResponse,
}

#[async_trait]
impl CommandProcessor for FakeProcessor {
    async fn run(&self, command: &Command) -> overcast_command::Result<CommandResponse> {
        self.log.lock().unwrap().push(Call::Fingerprint);
        if self.reply.is_success() {
            Ok(self.reply.clone())
        } else {
            Err(CommandError::NonZeroExit {
                command: command.clone(),
                response: self.reply.clone(),
            })
        }
    }
}

pub struct Harness {
    pub log: CallLog,
    pub vagrant: Arc<FakeVagrant>,
    pub virtualbox: Arc<FakeVirtualBox>,
    pub processor: Arc<FakeProcessor>,
    pub fingerprint_command: Command,
}

impl Harness {
    /// `status_output` is what `vagrant status` prints, `tag` the extra-data
    /// already on the VM, `fingerprint` the fingerprint command's stdout.
    pub fn new(status_output: &str, tag: Option<&str>, fingerprint: &str) -> Self {
        Self::with_fingerprint_reply(status_output, tag, CommandResponse::new(0, fingerprint, ""))
    }

    pub fn with_fingerprint_reply(
        status_output: &str,
        tag: Option<&str>,
        reply: CommandResponse,
    ) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        Self {
            vagrant: Arc::new(FakeVagrant {
                log: log.clone(),
                status_output: status_output.to_string(),
                failing_subcommand: Mutex::new(None),
            }),
            virtualbox: Arc::new(FakeVirtualBox {
                log: log.clone(),
                tag: Mutex::new(tag.map(String::from)),
                failing_operation: Mutex::new(None),
            }),
            processor: Arc::new(FakeProcessor {
                log: log.clone(),
                reply,
            }),
            fingerprint_command: Command::parse("my-command").expect("valid command"),
            log,
        }
    }

    pub fn cached_host(&self) -> CachedHost {
        CachedHost::new(
            VM,
            VM_ADDRESS,
            self.fingerprint_command.clone(),
            self.vagrant.clone(),
            self.virtualbox.clone(),
            self.processor.clone(),
        )
    }

    pub fn cached_host_with(&self, policy: ExistingVmPolicy) -> CachedHost {
        self.cached_host().with_policy(policy)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}
