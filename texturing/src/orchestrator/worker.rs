//! The per-job unit of work: execute, resolve, report.

use crate::config::TexturingConfig;
use crate::core::{Job, JobId, JobResult};
use crate::errors::TexturingError;
use crate::events::{EventSink, JobEventKind};
use crate::executor::{CommandExecutor, RenderCommand};
use crate::observability::SpanTimer;
use crate::registry::JobRegistry;
use crate::status::StatusResolver;
use crate::utils::iso_timestamp;
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Message used when a worker panics mid-job.
pub(crate) const WORKER_PANICKED_MESSAGE: &str = "job worker panicked";

/// Everything a spawned job needs, shared with the orchestrator.
#[derive(Clone)]
pub(crate) struct JobWorker {
    pub(crate) config: Arc<TexturingConfig>,
    pub(crate) resolver: Arc<StatusResolver>,
    pub(crate) executor: Arc<dyn CommandExecutor>,
    pub(crate) registry: Option<Arc<JobRegistry>>,
    pub(crate) events: Arc<dyn EventSink>,
    pub(crate) permits: Arc<Semaphore>,
}

impl JobWorker {
    /// Runs `job` to a terminal result. Never fails.
    ///
    /// A panic anywhere below is caught and reported like any other failure.
    pub(crate) async fn execute(&self, job: Job) -> JobResult {
        let job_id = job.id;
        let timer = SpanTimer::start("job");

        match AssertUnwindSafe(self.run(job)).catch_unwind().await {
            Ok(result) => self.finish(job_id, result, timer).await,
            Err(_) => {
                error!(job_id = %job_id, "Job worker panicked");
                self.finish(job_id, JobResult::failure(WORKER_PANICKED_MESSAGE), timer)
                    .await
            }
        }
    }

    async fn run(&self, job: Job) -> JobResult {
        let Ok(_permit) = self.permits.clone().acquire_owned().await else {
            return JobResult::failure("job worker pool is shut down");
        };

        if let Some(ref registry) = self.registry {
            registry.mark_processing(job.id);
        }
        self.events
            .emit(
                JobEventKind::Running.as_str(),
                Some(json!({
                    "job_id": job.id.to_string(),
                    "phase": JobEventKind::Running.phase(),
                    "timeout_secs": job.timeout.as_secs_f64(),
                    "timestamp": iso_timestamp(),
                })),
            )
            .await;

        let command = RenderCommand::for_job(&self.config, &job);
        match self.executor.run(&command, job.timeout).await {
            Ok(outcome) => {
                info!(job_id = %job.id, outcome = %outcome, "Render tool finished");
                self.resolver.resolve(&job, outcome).await
            }
            Err(TexturingError::ProcessLaunchFailure { executable, source }) => {
                warn!(
                    job_id = %job.id,
                    executable = %executable.display(),
                    error = %source,
                    "Render tool could not be launched"
                );
                JobResult::failure(format!("failed to launch render tool: {source}"))
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, kind = err.kind(), "Render tool execution failed");
                JobResult::failure(err.to_string())
            }
        }
    }

    async fn finish(&self, job_id: JobId, result: JobResult, timer: SpanTimer) -> JobResult {
        if let Some(ref registry) = self.registry {
            registry.complete(job_id, result.clone());
        }

        let duration_ms = timer.finish();
        if result.success {
            info!(job_id = %job_id, duration_ms, "Job completed");
        } else {
            warn!(job_id = %job_id, duration_ms, message = %result.message, "Job failed");
        }

        self.events
            .emit(
                JobEventKind::Completed.as_str(),
                Some(json!({
                    "job_id": job_id.to_string(),
                    "phase": JobEventKind::Completed.phase(),
                    "success": result.success,
                    "status": result.status,
                    "model_url": result.model_url,
                    "message": result.message,
                    "duration_ms": duration_ms,
                    "timestamp": iso_timestamp(),
                })),
            )
            .await;

        result
    }
}

impl std::fmt::Debug for JobWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobWorker")
            .field("available_permits", &self.permits.available_permits())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
