//! Job lifecycle event types.

use crate::core::JobPhase;
use serde::{Deserialize, Serialize};

/// A point in a job's lifecycle that is reported to the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobEventKind {
    /// A submission was accepted for preparation.
    Submitted,
    /// The workspace is being materialized.
    Preparing,
    /// Preparation failed; the error went back to the caller.
    PreparationFailed,
    /// The job is waiting for a concurrency permit.
    Queued,
    /// The render tool is running.
    Running,
    /// A terminal result was produced.
    Completed,
}

impl JobEventKind {
    /// All kinds in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Submitted,
        Self::Preparing,
        Self::PreparationFailed,
        Self::Queued,
        Self::Running,
        Self::Completed,
    ];

    /// Returns the dotted event type string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "job.submitted",
            Self::Preparing => "job.preparing",
            Self::PreparationFailed => "job.preparation_failed",
            Self::Queued => "job.queued",
            Self::Running => "job.running",
            Self::Completed => "job.completed",
        }
    }

    /// Returns the lifecycle phase the job is in when this event fires.
    ///
    /// Queued jobs have already been handed to the worker pool, so they are
    /// running from the state machine's point of view.
    #[must_use]
    pub fn phase(self) -> JobPhase {
        match self {
            Self::Submitted => JobPhase::Submitted,
            Self::Preparing => JobPhase::Preparing,
            Self::PreparationFailed => JobPhase::PreparationFailed,
            Self::Queued | Self::Running => JobPhase::Running,
            Self::Completed => JobPhase::Completed,
        }
    }
}

impl std::fmt::Display for JobEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_event_types_are_distinct_and_namespaced() {
        let names: HashSet<_> = JobEventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), JobEventKind::ALL.len());
        assert!(names.iter().all(|n| n.starts_with("job.")));
    }

    #[test]
    fn test_event_order_follows_phase_transitions() {
        let happy = [
            JobEventKind::Submitted,
            JobEventKind::Preparing,
            JobEventKind::Queued,
            JobEventKind::Completed,
        ];
        for pair in happy.windows(2) {
            assert!(pair[0].phase().can_transition_to(pair[1].phase()));
        }
        assert!(JobEventKind::Preparing
            .phase()
            .can_transition_to(JobEventKind::PreparationFailed.phase()));
        assert!(JobEventKind::Completed.phase().is_terminal());
    }
}
