//! Test double for [`CommandProcessor`].

use async_trait::async_trait;
use overcast_command::{Command, CommandError, CommandProcessor, CommandResponse};
use std::sync::{Arc, Mutex};

/// Records every command and answers with a canned response.
pub(crate) struct RecordingProcessor {
    reply: CommandResponse,
    commands: Mutex<Vec<Command>>,
}

impl RecordingProcessor {
    pub(crate) fn replying(reply: CommandResponse) -> Arc<Self> {
        Arc::new(Self {
            reply,
            commands: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandProcessor for RecordingProcessor {
    async fn run(&self, command: &Command) -> overcast_command::Result<CommandResponse> {
        self.commands.lock().unwrap().push(command.clone());
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
