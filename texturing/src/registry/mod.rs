//! Keyed store of job state for polling by job id.
//!
//! The orchestrator itself keeps no state once a job finishes; attach a
//! [`JobRegistry`] to make results queryable after the fact. Terminal
//! records expire after the configured TTL; in-flight records never do.

use crate::config::TexturingConfig;
use crate::core::{JobId, JobResult, JobStatus};
use crate::utils::{now_utc, Timestamp};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Point-in-time view of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    /// The job identifier.
    pub job_id: JobId,
    /// Current status.
    pub status: JobStatus,
    /// Terminal result, once there is one.
    pub result: Option<JobResult>,
    /// When the job was registered.
    pub submitted_at: Timestamp,
    /// When the record last changed.
    pub updated_at: Timestamp,
}

struct RegistryEntry {
    snapshot: JobSnapshot,
    finished_at: Option<Instant>,
}

/// Concurrent job state store with TTL expiry of finished jobs.
pub struct JobRegistry {
    entries: DashMap<JobId, RegistryEntry>,
    ttl: Duration,
}

impl JobRegistry {
    /// Creates a registry keeping finished jobs for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Creates a registry using the configured retention.
    #[must_use]
    pub fn from_config(config: &TexturingConfig) -> Self {
        Self::new(config.registry_ttl())
    }

    /// Returns the retention period for finished jobs.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Records a new queued job. Returns false if the id is already known.
    pub fn register(&self, job_id: JobId) -> bool {
        match self.entries.entry(job_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let now = now_utc();
                slot.insert(RegistryEntry {
                    snapshot: JobSnapshot {
                        job_id,
                        status: JobStatus::Queued,
                        result: None,
                        submitted_at: now,
                        updated_at: now,
                    },
                    finished_at: None,
                });
                true
            }
        }
    }

    /// Moves a queued job to processing.
    ///
    /// Returns false for unknown or already finished jobs.
    pub fn mark_processing(&self, job_id: JobId) -> bool {
        let Some(mut entry) = self.entries.get_mut(&job_id) else {
            return false;
        };
        if entry.snapshot.status.is_terminal() {
            return false;
        }
        entry.snapshot.status = JobStatus::Processing;
        entry.snapshot.updated_at = now_utc();
        true
    }

    /// Stores the terminal result of a job.
    ///
    /// Returns false if the job is unknown or already has a result; the
    /// first result always wins.
    pub fn complete(&self, job_id: JobId, result: JobResult) -> bool {
        let Some(mut entry) = self.entries.get_mut(&job_id) else {
            return false;
        };
        if entry.snapshot.result.is_some() {
            debug!(job_id = %job_id, "Ignoring second completion");
            return false;
        }
        entry.snapshot.status = result.status;
        entry.snapshot.result = Some(result);
        entry.snapshot.updated_at = now_utc();
        entry.finished_at = Some(Instant::now());
        true
    }

    /// Returns the current view of a job.
    #[must_use]
    pub fn snapshot(&self, job_id: JobId) -> Option<JobSnapshot> {
        self.entries.get(&job_id).map(|e| e.snapshot.clone())
    }

    /// Returns the current status of a job.
    #[must_use]
    pub fn status(&self, job_id: JobId) -> Option<JobStatus> {
        self.entries.get(&job_id).map(|e| e.snapshot.status)
    }

    /// Drops finished jobs older than the TTL. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry
                .finished_at
                .map_or(true, |finished| finished.elapsed() < self.ttl)
        });
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "Purged expired job records");
        }
        purged
    }

    /// Returns the number of tracked jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no jobs are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("jobs", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lifecycle() {
        let registry = JobRegistry::default();
        let id = JobId::new();

        assert!(registry.register(id));
        assert_eq!(registry.status(id), Some(JobStatus::Queued));

        assert!(registry.mark_processing(id));
        assert_eq!(registry.status(id), Some(JobStatus::Processing));

        assert!(registry.complete(id, JobResult::failure("boom")));
        let snapshot = registry.snapshot(id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(snapshot.result, Some(JobResult::failure("boom")));
        assert!(snapshot.updated_at >= snapshot.submitted_at);
    }

    #[test]
    fn test_from_config_ttl() {
        let config = TexturingConfig::new().with_registry_ttl(90.0);
        assert_eq!(JobRegistry::from_config(&config).ttl(), Duration::from_secs(90));
    }

    #[test]
    fn test_from_config_unvalidated_ttl() {
        let config = TexturingConfig::new().with_registry_ttl(f64::NAN);
        assert_eq!(JobRegistry::from_config(&config).ttl(), Duration::ZERO);

        let config = TexturingConfig::new().with_registry_ttl(1e20);
        assert_eq!(JobRegistry::from_config(&config).ttl(), Duration::MAX);
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let registry = JobRegistry::default();
        let id = JobId::new();
        assert!(registry.register(id));
        assert!(!registry.register(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_completion_wins() {
        let registry = JobRegistry::default();
        let id = JobId::new();
        registry.register(id);

        assert!(registry.complete(id, JobResult::success("http://m/1/result.glb", "ok")));
        assert!(!registry.complete(id, JobResult::failure("late")));
        assert!(!registry.mark_processing(id));

        let snapshot = registry.snapshot(id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Completed);
        assert!(snapshot.result.unwrap().success);
    }

    #[test]
    fn test_unknown_job() {
        let registry = JobRegistry::default();
        let id = JobId::new();
        assert!(!registry.mark_processing(id));
        assert!(!registry.complete(id, JobResult::failure("x")));
        assert!(registry.snapshot(id).is_none());
    }

    #[test]
    fn test_purge_keeps_in_flight_jobs() {
        let registry = JobRegistry::new(Duration::ZERO);
        let queued = JobId::new();
        let running = JobId::new();
        let done = JobId::new();
        for id in [queued, running, done] {
            registry.register(id);
        }
        registry.mark_processing(running);
        registry.complete(done, JobResult::failure("x"));

        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.snapshot(done).is_none());
        assert_eq!(registry.status(queued), Some(JobStatus::Queued));
        assert_eq!(registry.status(running), Some(JobStatus::Processing));
    }

    #[test]
    fn test_purge_respects_ttl() {
        let registry = JobRegistry::new(Duration::from_secs(3600));
        let id = JobId::new();
        registry.register(id);
        registry.complete(id, JobResult::failure("x"));

        assert_eq!(registry.purge_expired(), 0);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let registry = JobRegistry::default();
        let id = JobId::new();
        registry.register(id);

        let json = serde_json::to_value(registry.snapshot(id).unwrap()).unwrap();
        assert_eq!(json["jobId"], id.to_string());
        assert_eq!(json["status"], "queued");
        assert!(json["result"].is_null());
        assert!(json.get("submittedAt").is_some());
    }
}
