//! Render tool execution.
//!
//! [`CommandExecutor`] is the seam between the orchestrator and the outside
//! world. [`ProcessExecutor`] runs the real tool; tests substitute
//! [`ScriptedExecutor`](crate::testing::ScriptedExecutor).

mod command;
mod outcome;
mod process;

pub use command::RenderCommand;
pub use outcome::{ProcessOutcome, NO_EXIT_CODE};
pub use process::ProcessExecutor;

use crate::errors::TexturingResult;
use async_trait::async_trait;
use std::time::Duration;

/// Runs a render command under a hard timeout.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `command`, waiting at most `timeout` for it to exit.
    ///
    /// A timeout is not an error: it yields an outcome with `timed_out` set.
    /// Errors are reserved for failing to start the command at all.
    async fn run(&self, command: &RenderCommand, timeout: Duration) -> TexturingResult<ProcessOutcome>;
}

#[async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<T> {
    async fn run(&self, command: &RenderCommand, timeout: Duration) -> TexturingResult<ProcessOutcome> {
        (**self).run(command, timeout).await
    }
}
