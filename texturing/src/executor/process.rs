//! Subprocess-backed command executor.

use super::{CommandExecutor, ProcessOutcome, RenderCommand, NO_EXIT_CODE};
use crate::errors::{TexturingError, TexturingResult};
use crate::observability::SpanTimer;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Runs the render tool as a child process.
///
/// Stdout and stderr share one handle on the log file, so the log holds the
/// merged stream in write order. On timeout the child is killed outright and
/// reaped; its exit code is not inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Creates a new process executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, command: &RenderCommand, timeout: Duration) -> TexturingResult<ProcessOutcome> {
        let log_path = &command.log_path;
        let stdout_log = tokio::fs::File::create(log_path)
            .await
            .map_err(|e| TexturingError::io(log_path, e))?
            .into_std()
            .await;
        let stderr_log = stdout_log
            .try_clone()
            .map_err(|e| TexturingError::io(log_path, e))?;

        let mut cmd = Command::new(&command.executable);
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_log))
            .stderr(Stdio::from(stderr_log))
            .kill_on_drop(true);
        if let Some(ref dir) = command.working_dir {
            cmd.current_dir(dir);
        }

        info!(command = %command, "Launching render tool");
        let timer = SpanTimer::start("render_tool");

        let mut child = cmd
            .spawn()
            .map_err(|e| TexturingError::launch(&command.executable, e))?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let exit_code = status.code().unwrap_or(NO_EXIT_CODE);
                info!(
                    exit_code,
                    elapsed_ms = timer.elapsed_ms(),
                    "Render tool exited"
                );
                Ok(ProcessOutcome::exited(exit_code))
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed waiting on render tool");
                Err(TexturingError::Io(e))
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill timed out render tool");
                }
                error!(
                    timeout_secs = timeout.as_secs_f64(),
                    elapsed_ms = timer.elapsed_ms(),
                    "Render tool timed out and was killed"
                );
                Ok(ProcessOutcome::killed_on_timeout())
            }
        }
    }
}
