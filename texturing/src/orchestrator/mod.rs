//! Job submission and scheduling.
//!
//! [`JobOrchestrator`] drives each job through
//! `submitted -> preparing -> running -> completed`. Preparation happens on
//! the caller's task, so lookup misses and workspace failures come back as
//! errors from `submit_*`. Once a workspace exists the job is spawned onto
//! the runtime and the caller gets a [`JobHandle`] that always resolves to a
//! [`JobResult`](crate::core::JobResult).

mod handle;
mod worker;


pub use handle::JobHandle;

use crate::config::TexturingConfig;
use crate::core::JobId;
use crate::errors::{ResourceKind, TexturingError, TexturingResult};
use crate::events::{EventSink, JobEventKind, NoOpEventSink};
use crate::executor::{CommandExecutor, ProcessExecutor};
use crate::registry::{JobRegistry, JobSnapshot};
use crate::repository::{ShipModelRepository, TextureRepository};
use crate::status::StatusResolver;
use crate::utils::iso_timestamp;
use crate::workspace::{JobInputs, UploadedFile, Workspace, WorkspaceManager};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use worker::JobWorker;

/// Accepts render jobs and runs them concurrently under a permit limit.
pub struct JobOrchestrator {
    workspaces: WorkspaceManager,
    worker: JobWorker,
    models: Option<Arc<dyn ShipModelRepository>>,
    textures: Option<Arc<dyn TextureRepository>>,
}

impl JobOrchestrator {
    /// Creates an orchestrator running jobs through `executor`.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: TexturingConfig, executor: Arc<dyn CommandExecutor>) -> TexturingResult<Self> {
        config.validate()?;

        let workspaces = WorkspaceManager::from_config(&config);
        let resolver = StatusResolver::from_config(&config);
        let permits = Semaphore::new(config.max_concurrent_jobs);

        Ok(Self {
            workspaces,
            worker: JobWorker {
                config: Arc::new(config),
                resolver: Arc::new(resolver),
                executor,
                registry: None,
                events: Arc::new(NoOpEventSink),
                permits: Arc::new(permits),
            },
            models: None,
            textures: None,
        })
    }

    /// Creates an orchestrator that spawns the configured render tool.
    pub fn from_config(config: TexturingConfig) -> TexturingResult<Self> {
        Self::new(config, Arc::new(ProcessExecutor::new()))
    }

    /// Sets the ship model lookup used by [`submit_by_ids`](Self::submit_by_ids).
    #[must_use]
    pub fn with_model_repository(mut self, repository: Arc<dyn ShipModelRepository>) -> Self {
        self.models = Some(repository);
        self
    }

    /// Sets the texture lookup used by [`submit_by_ids`](Self::submit_by_ids).
    #[must_use]
    pub fn with_texture_repository(mut self, repository: Arc<dyn TextureRepository>) -> Self {
        self.textures = Some(repository);
        self
    }

    /// Uses one store for both lookups.
    #[must_use]
    pub fn with_repository<R>(self, repository: Arc<R>) -> Self
    where
        R: ShipModelRepository + TextureRepository + 'static,
    {
        self.with_model_repository(repository.clone())
            .with_texture_repository(repository)
    }

    /// Records job state in `registry` for polling by id.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<JobRegistry>) -> Self {
        self.worker.registry = Some(registry);
        self
    }

    /// Sends lifecycle events to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.worker.events = sink;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &TexturingConfig {
        &self.worker.config
    }

    /// Returns the attached registry, if any.
    #[must_use]
    pub fn registry(&self) -> Option<&Arc<JobRegistry>> {
        self.worker.registry.as_ref()
    }

    /// Returns the registry's view of a job.
    ///
    /// `None` when no registry is attached or the job is unknown or expired.
    #[must_use]
    pub fn job_status(&self, job_id: JobId) -> Option<JobSnapshot> {
        self.worker.registry.as_ref()?.snapshot(job_id)
    }

    /// Returns how many more jobs could start running right now.
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.worker.permits.available_permits()
    }

    /// Submits a job whose inputs are looked up by identifier.
    ///
    /// The ship model is looked up first; a miss fails the submission
    /// without consulting the texture repository.
    pub async fn submit_by_ids(&self, ship_id: i64, date_id: i64) -> TexturingResult<JobHandle> {
        let job_id = self
            .begin(json!({"source": "lookup", "ship_id": ship_id, "date_id": date_id}))
            .await;

        let prepared = match self.lookup_inputs(ship_id, date_id).await {
            Ok(inputs) => self.workspaces.prepare_with_id(job_id, inputs).await,
            Err(err) => Err(err),
        };
        self.dispatch(job_id, prepared).await
    }

    /// Submits a job from three uploaded files.
    pub async fn submit_upload(
        &self,
        model: UploadedFile,
        top_texture: UploadedFile,
        side_texture: UploadedFile,
    ) -> TexturingResult<JobHandle> {
        let job_id = self
            .begin(json!({
                "source": "upload",
                "model": model.original_name,
                "top_texture": top_texture.original_name,
                "side_texture": side_texture.original_name,
            }))
            .await;

        let inputs = JobInputs::from_uploads(model, top_texture, side_texture);
        let prepared = self.workspaces.prepare_with_id(job_id, inputs).await;
        self.dispatch(job_id, prepared).await
    }

    /// Submits a job from already-resolved inputs.
    pub async fn submit(&self, inputs: JobInputs) -> TexturingResult<JobHandle> {
        let job_id = self
            .begin(json!({"source": "inputs", "bytes": inputs.total_bytes()}))
            .await;

        let prepared = self.workspaces.prepare_with_id(job_id, inputs).await;
        self.dispatch(job_id, prepared).await
    }

    async fn begin(&self, details: Value) -> JobId {
        let job_id = JobId::new();
        debug!(job_id = %job_id, details = %details, "Job submitted");

        let mut submitted = details;
        if let Value::Object(ref mut fields) = submitted {
            fields.insert("job_id".into(), json!(job_id.to_string()));
            fields.insert("phase".into(), json!(JobEventKind::Submitted.phase()));
            fields.insert("timestamp".into(), json!(iso_timestamp()));
        }
        self.emit(JobEventKind::Submitted, submitted).await;
        self.emit(JobEventKind::Preparing, Self::payload(job_id, JobEventKind::Preparing))
            .await;

        job_id
    }

    async fn lookup_inputs(&self, ship_id: i64, date_id: i64) -> TexturingResult<JobInputs> {
        let (Some(models), Some(textures)) = (&self.models, &self.textures) else {
            return Err(TexturingError::configuration(
                "submitting by id requires model and texture repositories",
            ));
        };

        let model = models
            .find_ship_model_bytes(ship_id)
            .await?
            .ok_or_else(|| TexturingError::not_found(ResourceKind::ShipModel, ship_id))?;
        let textures = textures
            .find_texture_bytes(date_id)
            .await?
            .ok_or_else(|| TexturingError::not_found(ResourceKind::Texture, date_id))?;

        Ok(JobInputs::from_lookup(model, textures))
    }

    async fn dispatch(
        &self,
        job_id: JobId,
        prepared: TexturingResult<Workspace>,
    ) -> TexturingResult<JobHandle> {
        let workspace = match prepared {
            Ok(workspace) => workspace,
            Err(err) => {
                warn!(job_id = %job_id, error = %err, kind = err.kind(), "Job preparation failed");
                let mut payload = Self::payload(job_id, JobEventKind::PreparationFailed);
                payload["error"] = json!(err.to_dict());
                self.emit(JobEventKind::PreparationFailed, payload).await;
                return Err(err);
            }
        };

        if let Some(ref registry) = self.worker.registry {
            registry.register(job_id);
        }
        let mut queued = Self::payload(job_id, JobEventKind::Queued);
        queued["workspace"] = json!(workspace.dir().display().to_string());
        self.worker.events.try_emit(JobEventKind::Queued.as_str(), Some(queued));

        info!(
            job_id = %job_id,
            workspace = %workspace.dir().display(),
            available_slots = self.available_slots(),
            "Job queued"
        );

        let worker = self.worker.clone();
        let job = workspace.into_job();
        let task = tokio::spawn(async move { worker.execute(job).await });
        Ok(JobHandle::new(job_id, task))
    }

    fn payload(job_id: JobId, kind: JobEventKind) -> Value {
        json!({
            "job_id": job_id.to_string(),
            "phase": kind.phase(),
            "timestamp": iso_timestamp(),
        })
    }

    async fn emit(&self, kind: JobEventKind, payload: Value) {
        self.worker.events.emit(kind.as_str(), Some(payload)).await;
    }
}

impl std::fmt::Debug for JobOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobOrchestrator")
            .field("workspaces", &self.workspaces)
            .field("worker", &self.worker)
            .field("has_model_repository", &self.models.is_some())
            .field("has_texture_repository", &self.textures.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::JobStatus;
    use crate::events::CollectingEventSink;
    use crate::repository::{InMemoryRepository, MockShipModelRepository, MockTextureRepository};
    use crate::testing::{
        sample_inputs, seeded_repository, test_config, ScriptedExecutor, ScriptedRun,
        KNOWN_DATE_ID, KNOWN_SHIP_ID, TEST_BASE_URL,
    };
    use pretty_assertions::assert_eq;

    fn orchestrator(root: &std::path::Path, run: ScriptedRun) -> (JobOrchestrator, Arc<ScriptedExecutor>) {
        let executor = Arc::new(ScriptedExecutor::new(run));
        let orchestrator = JobOrchestrator::new(test_config(root), executor.clone())
            .unwrap()
            .with_repository(Arc::new(seeded_repository()));
        (orchestrator, executor)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TexturingConfig::new().with_max_concurrent_jobs(0);
        let err = JobOrchestrator::new(config, Arc::new(ScriptedExecutor::new(ScriptedRun::exit(0))))
            .unwrap_err();
        assert!(matches!(err, TexturingError::Configuration(_)));
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        let config = TexturingConfig::new().with_timeout(1e20);
        let err = JobOrchestrator::new(config, Arc::new(ScriptedExecutor::new(ScriptedRun::exit(0))))
            .unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[tokio::test]
    async fn test_submit_by_ids_success() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, executor) = orchestrator(dir.path(), ScriptedRun::success("ok"));

        let handle = orchestrator.submit_by_ids(KNOWN_SHIP_ID, KNOWN_DATE_ID).await.unwrap();
        let job_id = handle.job_id();
        let result = handle.await;

        assert!(result.success, "{result:?}");
        assert_eq!(
            result.model_url.as_deref(),
            Some(format!("{TEST_BASE_URL}/{job_id}/result.glb").as_str())
        );
        assert_eq!(result.message, "ok");

        let commands = executor.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(std::fs::read(&commands[0].model_path).unwrap(), b"ply ship");
        assert_eq!(std::fs::read(&commands[0].top_texture_path).unwrap(), b"top date");
        assert_eq!(std::fs::read(&commands[0].side_texture_path).unwrap(), b"side date");
    }

    #[tokio::test]
    async fn test_missing_ship_skips_texture_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut models = MockShipModelRepository::new();
        models
            .expect_find_ship_model_bytes()
            .withf(|id| *id == 999)
            .times(1)
            .returning(|_| Ok(None));
        let mut textures = MockTextureRepository::new();
        textures.expect_find_texture_bytes().never();

        let executor = Arc::new(ScriptedExecutor::new(ScriptedRun::success("ok")));
        let orchestrator = JobOrchestrator::new(test_config(dir.path()), executor.clone())
            .unwrap()
            .with_model_repository(Arc::new(models))
            .with_texture_repository(Arc::new(textures));

        let err = orchestrator.submit_by_ids(999, KNOWN_DATE_ID).await.unwrap_err();

        assert!(matches!(
            err,
            TexturingError::ResourceNotFound { resource: ResourceKind::ShipModel, id: 999 }
        ));
        assert_eq!(executor.call_count(), 0);
        assert!(!orchestrator.config().temp_dir.exists());
    }

    #[tokio::test]
    async fn test_missing_texture_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::success("ok"));

        let err = orchestrator.submit_by_ids(KNOWN_SHIP_ID, 404).await.unwrap_err();

        assert!(matches!(
            err,
            TexturingError::ResourceNotFound { resource: ResourceKind::Texture, id: 404 }
        ));
        assert!(!orchestrator.config().temp_dir.exists());
    }

    #[tokio::test]
    async fn test_repository_failure_is_preparation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut models = MockShipModelRepository::new();
        models
            .expect_find_ship_model_bytes()
            .returning(|_| Err(TexturingError::repository("connection refused")));

        let orchestrator = JobOrchestrator::new(
            test_config(dir.path()),
            Arc::new(ScriptedExecutor::new(ScriptedRun::success("ok"))),
        )
        .unwrap()
        .with_model_repository(Arc::new(models))
        .with_texture_repository(Arc::new(InMemoryRepository::new()));

        let err = orchestrator.submit_by_ids(1, 2).await.unwrap_err();
        assert!(matches!(err, TexturingError::Repository(_)));
    }

    #[tokio::test]
    async fn test_submit_by_ids_without_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = JobOrchestrator::new(
            test_config(dir.path()),
            Arc::new(ScriptedExecutor::new(ScriptedRun::success("ok"))),
        )
        .unwrap();

        let err = orchestrator.submit_by_ids(1, 2).await.unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[tokio::test]
    async fn test_launch_failure_folded_into_result() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::launch_failure());

        let result = orchestrator.submit(sample_inputs("a")).await.unwrap().await;

        assert!(!result.success);
        assert!(result.model_url.is_none());
        assert!(result.message.starts_with("failed to launch render tool: "));
    }

    #[tokio::test]
    async fn test_lifecycle_events_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CollectingEventSink::new());
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::success("ok"));
        let orchestrator = orchestrator.with_event_sink(sink.clone());

        let handle = orchestrator.submit(sample_inputs("a")).await.unwrap();
        let job_id = handle.job_id().to_string();
        handle.await;

        assert_eq!(
            sink.types_for_job(&job_id),
            vec!["job.submitted", "job.preparing", "job.queued", "job.running", "job.completed"]
        );
        let completed = sink.events_of_type("job.completed");
        let data = completed[0].data.as_ref().unwrap();
        assert_eq!(data["success"], true);
        assert_eq!(data["status"], "completed");

        for event in sink.events() {
            let timestamp = event.data.as_ref().unwrap()["timestamp"].as_str().unwrap().to_owned();
            assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok(), "{timestamp}");
        }
    }

    #[tokio::test]
    async fn test_preparation_failure_event() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CollectingEventSink::new());
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::success("ok"));
        let orchestrator = orchestrator.with_event_sink(sink.clone());

        orchestrator.submit_by_ids(999, KNOWN_DATE_ID).await.unwrap_err();

        assert_eq!(
            sink.event_types(),
            vec!["job.submitted", "job.preparing", "job.preparation_failed"]
        );
        let failed = &sink.events_of_type("job.preparation_failed")[0];
        let error = &failed.data.as_ref().unwrap()["error"];
        assert_eq!(error["type"], "resource_not_found");
        assert_eq!(error["stage"], "preparation");
    }

    #[tokio::test]
    async fn test_registry_tracks_job() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JobRegistry::default());
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::reported_failure("no camera"));
        let orchestrator = orchestrator.with_registry(registry.clone());

        let handle = orchestrator.submit(sample_inputs("a")).await.unwrap();
        let job_id = handle.job_id();
        let result = handle.await;

        let snapshot = orchestrator.job_status(job_id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(snapshot.result, Some(result));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_preparation_failure_not_registered() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JobRegistry::default());
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::success("ok"));
        let orchestrator = orchestrator.with_registry(registry.clone());

        orchestrator.submit_by_ids(999, KNOWN_DATE_ID).await.unwrap_err();

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_job_status_without_registry() {
        let dir = tempfile::tempdir().unwrap();
        let (orchestrator, _) = orchestrator(dir.path(), ScriptedRun::success("ok"));

        let handle = orchestrator.submit(sample_inputs("a")).await.unwrap();
        let job_id = handle.job_id();
        handle.await;

        assert!(orchestrator.registry().is_none());
        assert!(orchestrator.job_status(job_id).is_none());
    }
}
