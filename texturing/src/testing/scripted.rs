//! A scripted stand-in for the render tool.

use crate::errors::{TexturingError, TexturingResult};
use crate::executor::{CommandExecutor, ProcessOutcome, RenderCommand};
use crate::status::{status_artifact_path, StatusArtifact};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What one scripted invocation does.
///
/// Files are written first, then the run sleeps for `delay`. A delay past
/// the timeout yields a killed-on-timeout outcome, with whatever was written
/// left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedRun {
    /// Exit code reported when the run finishes in time.
    pub exit_code: i32,
    /// Raw text for the status artifact; `None` writes nothing.
    pub status_artifact: Option<String>,
    /// Copy the model input to the output path.
    pub write_output: bool,
    /// Text written to the log file.
    pub log: String,
    /// Simulated run time.
    pub delay: Duration,
    /// Fail as if the executable could not be started.
    pub launch_failure: bool,
}

impl ScriptedRun {
    /// A run that renders and reports `{"status":"success"}`.
    #[must_use]
    pub fn success(message: &str) -> Self {
        Self::with_artifact(0, &StatusArtifact::success(message)).with_output()
    }

    /// A clean exit whose artifact reports a non-success status.
    #[must_use]
    pub fn reported_failure(message: &str) -> Self {
        Self::with_artifact(0, &StatusArtifact::with_status("error", message))
    }

    /// A run that exits with `code` and writes no artifact.
    #[must_use]
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            status_artifact: None,
            write_output: false,
            log: format!("exiting with {code}\n"),
            delay: Duration::ZERO,
            launch_failure: false,
        }
    }

    /// A clean exit that writes `raw` verbatim as the artifact.
    #[must_use]
    pub fn raw_artifact(raw: impl Into<String>) -> Self {
        Self {
            status_artifact: Some(raw.into()),
            ..Self::exit(0)
        }
    }

    /// A run whose executable cannot be started.
    #[must_use]
    pub fn launch_failure() -> Self {
        Self {
            launch_failure: true,
            ..Self::exit(0)
        }
    }

    fn with_artifact(exit_code: i32, artifact: &StatusArtifact) -> Self {
        Self {
            status_artifact: serde_json::to_string(artifact).ok(),
            ..Self::exit(exit_code)
        }
    }

    /// Also copies the model input to the output path.
    #[must_use]
    pub fn with_output(mut self) -> Self {
        self.write_output = true;
        self
    }

    /// Sets the simulated run time.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A [`CommandExecutor`] that replays [`ScriptedRun`]s instead of spawning.
///
/// Runs are consumed in order; once exhausted the fallback run repeats.
#[derive(Debug)]
pub struct ScriptedExecutor {
    queued: Mutex<VecDeque<ScriptedRun>>,
    fallback: ScriptedRun,
    commands: Mutex<Vec<RenderCommand>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExecutor {
    /// Creates an executor that always performs `run`.
    #[must_use]
    pub fn new(run: ScriptedRun) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: run,
            commands: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queues a run ahead of the fallback.
    #[must_use]
    pub fn then(self, run: ScriptedRun) -> Self {
        self.queued.lock().push_back(run);
        self
    }

    /// Returns every command received, in arrival order.
    #[must_use]
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.commands.lock().clone()
    }

    /// Returns how many times the executor was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.commands.lock().len()
    }

    /// Returns the highest number of runs observed at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_run(&self) -> ScriptedRun {
        self.queued
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn perform(
        run: &ScriptedRun,
        command: &RenderCommand,
        timeout: Duration,
    ) -> TexturingResult<ProcessOutcome> {
        tokio::fs::write(&command.log_path, run.log.as_bytes())
            .await
            .map_err(|e| TexturingError::io(&command.log_path, e))?;

        if run.launch_failure {
            return Err(TexturingError::launch(
                &command.executable,
                std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            ));
        }

        if run.write_output {
            let model = tokio::fs::read(&command.model_path)
                .await
                .map_err(|e| TexturingError::io(&command.model_path, e))?;
            tokio::fs::write(&command.output_path, model)
                .await
                .map_err(|e| TexturingError::io(&command.output_path, e))?;
        }

        if let Some(ref raw) = run.status_artifact {
            let path = status_artifact_path(&command.output_path);
            tokio::fs::write(&path, raw.as_bytes())
                .await
                .map_err(|e| TexturingError::io(&path, e))?;
        }

        if run.delay >= timeout {
            tokio::time::sleep(timeout).await;
            return Ok(ProcessOutcome::killed_on_timeout());
        }
        if !run.delay.is_zero() {
            tokio::time::sleep(run.delay).await;
        }
        Ok(ProcessOutcome::exited(run.exit_code))
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, command: &RenderCommand, timeout: Duration) -> TexturingResult<ProcessOutcome> {
        self.commands.lock().push(command.clone());
        let run = self.next_run();

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = Self::perform(&run, command, timeout).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result
    }
}
