//! The caller's end of a submitted job.

use crate::core::{JobId, JobResult};
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::error;

/// Resolves to the job's terminal [`JobResult`].
///
/// Awaiting the handle never yields an error: a worker that is aborted by
/// runtime shutdown resolves to a failed result as well. Dropping the handle
/// detaches the job; it still runs to completion.
#[derive(Debug)]
pub struct JobHandle {
    job_id: JobId,
    task: JoinHandle<JobResult>,
}

impl JobHandle {
    pub(crate) fn new(job_id: JobId, task: JoinHandle<JobResult>) -> Self {
        Self { job_id, task }
    }

    /// Returns the identifier assigned at submission.
    #[must_use]
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns true once the job has a terminal result.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for JobHandle {
    type Output = JobResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let job_id = self.job_id;
        self.task.poll_unpin(cx).map(|joined| {
            joined.unwrap_or_else(|err| {
                error!(job_id = %job_id, error = %err, "Job worker did not finish");
                JobResult::failure(format!("job worker did not finish: {err}"))
            })
        })
    }
}
