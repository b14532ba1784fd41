//! Job status and lifecycle phase enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The caller-visible status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted and waiting for a worker slot.
    Queued,
    /// The render tool is running.
    Processing,
    /// Finished with a usable model.
    Completed,
    /// Finished without a usable model.
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Queued
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl JobStatus {
    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the job is still in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Processing)
    }
}

/// Internal lifecycle phase of a job.
///
/// ```text
/// Submitted -> Preparing -> Running -> Completed
///         \        \
///          +--------+-> PreparationFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Inputs received.
    Submitted,
    /// Inputs are being resolved and written to the workspace.
    Preparing,
    /// The unit of work has been handed to the worker pool.
    Running,
    /// A terminal `JobResult` was produced.
    Completed,
    /// Inputs could not be resolved or materialized.
    PreparationFailed,
}

impl Default for JobPhase {
    fn default() -> Self {
        Self::Submitted
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Preparing => write!(f, "preparing"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::PreparationFailed => write!(f, "preparation_failed"),
        }
    }
}

impl JobPhase {
    /// Returns true if the phase is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::PreparationFailed)
    }

    /// Returns true if `next` is a legal successor of this phase.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::Preparing)
                | (Self::Submitted | Self::Preparing, Self::PreparationFailed)
                | (Self::Preparing, Self::Running)
                | (Self::Running, Self::Completed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Queued.to_string(), "queued");
        assert_eq!(JobStatus::Processing.to_string(), "processing");
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_job_status_is_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(JobStatus::Processing.is_active());
    }

    #[test]
    fn test_job_status_serialize() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);

        let deserialized: JobStatus = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(deserialized, JobStatus::Failed);
    }

    #[test]
    fn test_phase_transitions() {
        assert!(JobPhase::Submitted.can_transition_to(JobPhase::Preparing));
        assert!(JobPhase::Preparing.can_transition_to(JobPhase::Running));
        assert!(JobPhase::Running.can_transition_to(JobPhase::Completed));
        assert!(JobPhase::Submitted.can_transition_to(JobPhase::PreparationFailed));
        assert!(JobPhase::Preparing.can_transition_to(JobPhase::PreparationFailed));

        assert!(!JobPhase::Running.can_transition_to(JobPhase::PreparationFailed));
        assert!(!JobPhase::Completed.can_transition_to(JobPhase::Running));
        assert!(!JobPhase::Submitted.can_transition_to(JobPhase::Running));
    }

    #[test]
    fn test_terminal_phases_have_no_successor() {
        let all = [
            JobPhase::Submitted,
            JobPhase::Preparing,
            JobPhase::Running,
            JobPhase::Completed,
            JobPhase::PreparationFailed,
        ];
        for terminal in all.iter().filter(|p| p.is_terminal()) {
            assert!(all.iter().all(|next| !terminal.can_transition_to(*next)));
        }
    }
}
