//! # overcast-command
//!
//! External process execution for overcast.
//!
//! A [`Command`] describes an invocation, a [`CommandProcessor`] runs it and
//! returns a [`CommandResponse`]. Exit code zero is the only success signal:
//! anything else becomes [`CommandError::NonZeroExit`], which keeps the full
//! response for diagnostics.
//!
//! ```no_run
//! use overcast_command::{Command, CommandProcessor, ProcessRunner};
//!
//! # async fn example() -> overcast_command::Result<()> {
//! let runner = ProcessRunner::new();
//! let response = runner.run(&Command::parse("git rev-parse HEAD")?).await?;
//! println!("revision: {}", response.stdout.trim());
//! # Ok(())
//! # }
//! ```

mod command;
mod error;
mod processor;

pub use command::{Command, CommandResponse};
pub use error::{CommandError, Result};
pub use processor::{CommandProcessor, ProcessRunner};
