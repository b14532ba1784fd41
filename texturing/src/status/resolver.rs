//! Combines a process outcome with the status artifact.

use super::artifact::{read_status_artifact, StatusArtifact};
use crate::config::TexturingConfig;
use crate::core::{Job, JobId, JobResult, OUTPUT_FILE_NAME};
use crate::executor::ProcessOutcome;
use std::time::Duration;
use tracing::{debug, warn};

/// Message used when the render tool exits with a nonzero code.
pub const EXECUTION_FAILED_MESSAGE: &str = "render tool execution failed";

/// Turns a finished process into a terminal [`JobResult`].
///
/// Priority, first match wins:
/// 1. timed out: failure, artifact not read
/// 2. nonzero exit: failure, artifact not read
/// 3. artifact missing or malformed: failure
/// 4. artifact status decides, its message is copied verbatim
#[derive(Debug, Clone)]
pub struct StatusResolver {
    output_base_url: String,
}

impl StatusResolver {
    /// Creates a resolver publishing models under `output_base_url`.
    #[must_use]
    pub fn new(output_base_url: impl Into<String>) -> Self {
        let url: String = output_base_url.into();
        Self {
            output_base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a resolver from configuration.
    #[must_use]
    pub fn from_config(config: &TexturingConfig) -> Self {
        Self::new(config.output_base_url.clone())
    }

    /// Returns the public URL of a job's rendered model.
    #[must_use]
    pub fn model_url(&self, job_id: JobId) -> String {
        format!("{}/{}/{}", self.output_base_url, job_id, OUTPUT_FILE_NAME)
    }

    /// Resolves the final result of `job`.
    pub async fn resolve(&self, job: &Job, outcome: ProcessOutcome) -> JobResult {
        if let Some(result) = Self::resolve_outcome(outcome, job.timeout) {
            return result;
        }

        let path = job.status_artifact_path();
        match read_status_artifact(&path).await {
            Ok(artifact) => self.resolve_artifact(job.id, &artifact),
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "Render tool exited cleanly without a usable status artifact");
                JobResult::failure(e.to_string())
            }
        }
    }

    /// Applies the process-level rules. `None` means the artifact decides.
    #[must_use]
    pub fn resolve_outcome(outcome: ProcessOutcome, timeout: Duration) -> Option<JobResult> {
        if outcome.timed_out {
            return Some(JobResult::failure(format!(
                "render tool timed out after {}s",
                timeout.as_secs_f64()
            )));
        }
        if outcome.exit_code != 0 {
            return Some(JobResult::failure(format!(
                "{EXECUTION_FAILED_MESSAGE} (exit code {})",
                outcome.exit_code
            )));
        }
        None
    }

    /// Applies the artifact-level rule for a clean exit.
    #[must_use]
    pub fn resolve_artifact(&self, job_id: JobId, artifact: &StatusArtifact) -> JobResult {
        if artifact.is_success() {
            debug!(job_id = %job_id, "Render tool reported success");
            JobResult::success(self.model_url(job_id), artifact.message.clone())
        } else {
            debug!(job_id = %job_id, status = %artifact.status, "Render tool reported failure");
            JobResult::failure(artifact.message.clone())
        }
    }
}
