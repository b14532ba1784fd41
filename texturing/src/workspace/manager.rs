//! Workspace preparation.

use super::inputs::{
    InputFile, JobInputs, DEFAULT_MODEL_FILE, DEFAULT_SIDE_TEXTURE_FILE, DEFAULT_TOP_TEXTURE_FILE,
};
use crate::config::TexturingConfig;
use crate::core::{Job, JobId, LOG_FILE_NAME, OUTPUT_FILE_NAME};
use crate::errors::{TexturingError, TexturingResult};
use crate::observability::SpanTimer;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// A prepared, exclusively owned job workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    job: Job,
}

impl Workspace {
    /// Returns the job identifier.
    #[must_use]
    pub fn id(&self) -> JobId {
        self.job.id
    }

    /// Returns the workspace directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.job.workspace_dir
    }

    /// Returns the prepared job.
    #[must_use]
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Consumes the workspace, yielding the job.
    #[must_use]
    pub fn into_job(self) -> Job {
        self.job
    }
}

/// Creates job workspaces under the configured roots.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    temp_root: PathBuf,
    output_root: PathBuf,
    timeout: Duration,
}

impl WorkspaceManager {
    /// Creates a new workspace manager.
    #[must_use]
    pub fn new(temp_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            temp_root: temp_root.into(),
            output_root: output_root.into(),
            timeout,
        }
    }

    /// Creates a workspace manager from configuration.
    #[must_use]
    pub fn from_config(config: &TexturingConfig) -> Self {
        Self::new(&config.temp_dir, &config.output_dir, config.timeout())
    }

    /// Returns the workspace root.
    #[must_use]
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Returns the output root.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Prepares a workspace under a freshly generated job identifier.
    pub async fn prepare(&self, inputs: JobInputs) -> TexturingResult<Workspace> {
        self.prepare_with_id(JobId::new(), inputs).await
    }

    /// Prepares a workspace under the given job identifier.
    ///
    /// Fails without touching the filesystem when upload names are unusable.
    /// Any later failure removes the half-built workspace directory.
    pub async fn prepare_with_id(&self, id: JobId, inputs: JobInputs) -> TexturingResult<Workspace> {
        let timer = SpanTimer::start("prepare");
        let names = InputNames::resolve(&inputs)?;
        let workspace_dir = self.temp_root.join(id.to_string());
        let output_dir = self.output_root.join(id.to_string());

        create_root(&self.temp_root).await?;
        create_exclusive(&workspace_dir).await?;

        if let Err(err) = self
            .materialize(&workspace_dir, &output_dir, &names, inputs)
            .await
        {
            discard(&workspace_dir).await;
            return Err(err);
        }

        let job = Job {
            id,
            model_path: workspace_dir.join(&names.model),
            top_texture_path: workspace_dir.join(&names.top_texture),
            side_texture_path: workspace_dir.join(&names.side_texture),
            output_path: output_dir.join(OUTPUT_FILE_NAME),
            log_path: workspace_dir.join(LOG_FILE_NAME),
            workspace_dir,
            timeout: self.timeout,
        };

        debug!(
            job_id = %id,
            workspace = %job.workspace_dir.display(),
            output = %job.output_path.display(),
            phase = timer.name(),
            elapsed_ms = timer.elapsed_ms(),
            "Workspace prepared"
        );

        Ok(Workspace { job })
    }

    async fn materialize(
        &self,
        workspace_dir: &Path,
        output_dir: &Path,
        names: &InputNames,
        inputs: JobInputs,
    ) -> TexturingResult<()> {
        write_input(&workspace_dir.join(&names.model), &inputs.model).await?;
        write_input(&workspace_dir.join(&names.top_texture), &inputs.top_texture).await?;
        write_input(&workspace_dir.join(&names.side_texture), &inputs.side_texture).await?;

        create_root(&self.output_root).await?;
        create_exclusive(output_dir).await
    }
}

/// Resolved workspace file names for the three inputs.
#[derive(Debug)]
struct InputNames {
    model: String,
    top_texture: String,
    side_texture: String,
}

impl InputNames {
    fn resolve(inputs: &JobInputs) -> TexturingResult<Self> {
        let names = Self {
            model: file_name_for(&inputs.model, DEFAULT_MODEL_FILE)?,
            top_texture: file_name_for(&inputs.top_texture, DEFAULT_TOP_TEXTURE_FILE)?,
            side_texture: file_name_for(&inputs.side_texture, DEFAULT_SIDE_TEXTURE_FILE)?,
        };

        let all = [&names.model, &names.top_texture, &names.side_texture];
        for (i, name) in all.iter().enumerate() {
            if name.as_str() == LOG_FILE_NAME {
                return Err(TexturingError::invalid_upload(format!(
                    "file name '{name}' is reserved"
                )));
            }
            if all[i + 1..].contains(name) {
                return Err(TexturingError::invalid_upload(format!(
                    "file name '{name}' is used by more than one input"
                )));
            }
        }

        Ok(names)
    }
}

/// Reduces a client-supplied name to a bare file name.
fn file_name_for(input: &InputFile, default: &str) -> TexturingResult<String> {
    let Some(original) = input.file_name.as_deref() else {
        return Ok(default.to_string());
    };

    let base = original.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return Err(TexturingError::invalid_upload(format!(
            "unusable file name '{original}'"
        )));
    }
    Ok(base.to_string())
}

async fn create_root(path: &Path) -> TexturingResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| TexturingError::io(path, e))
}

async fn create_exclusive(path: &Path) -> TexturingResult<()> {
    tokio::fs::create_dir(path)
        .await
        .map_err(|e| TexturingError::io(path, e))
}

async fn write_input(path: &Path, input: &InputFile) -> TexturingResult<()> {
    tokio::fs::write(path, &input.bytes)
        .await
        .map_err(|e| TexturingError::io(path, e))
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove abandoned workspace");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TextureBytes;
    use crate::workspace::UploadedFile;
    use pretty_assertions::assert_eq;

    fn manager(root: &Path) -> WorkspaceManager {
        WorkspaceManager::new(root.join("work"), root.join("out"), Duration::from_secs(600))
    }

    fn lookup_inputs() -> JobInputs {
        JobInputs::from_lookup(b"ply".to_vec(), TextureBytes::new(b"top".to_vec(), b"side".to_vec()))
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_prepare_lookup_uses_default_names() {
        let root = tempfile::tempdir().unwrap();
        let workspace = manager(root.path()).prepare(lookup_inputs()).await.unwrap();
        let job = workspace.job();

        assert_eq!(
            entries(workspace.dir()),
            vec!["model.ply", "texture_side.jpg", "texture_top.jpg"]
        );
        assert_eq!(std::fs::read(&job.model_path).unwrap(), b"ply");
        assert_eq!(std::fs::read(&job.top_texture_path).unwrap(), b"top");
        assert_eq!(std::fs::read(&job.side_texture_path).unwrap(), b"side");

        let id = job.id.to_string();
        assert_eq!(job.workspace_dir, root.path().join("work").join(&id));
        assert_eq!(job.output_path, root.path().join("out").join(&id).join("result.glb"));
        assert!(job.output_dir().is_dir());
        assert!(!job.log_path.exists());
        assert_eq!(job.timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_prepare_upload_keeps_original_names() {
        let root = tempfile::tempdir().unwrap();
        let inputs = JobInputs::from_uploads(
            UploadedFile::new("hull.ply", vec![1]),
            UploadedFile::new("C:\\scans\\deck.png", vec![2]),
            UploadedFile::new("../../side.png", vec![3]),
        );

        let workspace = manager(root.path()).prepare(inputs).await.unwrap();

        assert_eq!(entries(workspace.dir()), vec!["deck.png", "hull.ply", "side.png"]);
        assert!(workspace.job().side_texture_path.starts_with(workspace.dir()));
    }

    #[tokio::test]
    async fn test_duplicate_upload_names_rejected_before_io() {
        let root = tempfile::tempdir().unwrap();
        let inputs = JobInputs::from_uploads(
            UploadedFile::new("hull.ply", vec![1]),
            UploadedFile::new("tex.png", vec![2]),
            UploadedFile::new("tex.png", vec![3]),
        );

        let err = manager(root.path()).prepare(inputs).await.unwrap_err();

        assert_eq!(err.kind(), "invalid_upload");
        assert!(!root.path().join("work").exists());
    }

    #[tokio::test]
    async fn test_reserved_and_empty_names_rejected() {
        let root = tempfile::tempdir().unwrap();
        let mgr = manager(root.path());

        let reserved = JobInputs::from_uploads(
            UploadedFile::new("process.log", vec![1]),
            UploadedFile::new("a.png", vec![2]),
            UploadedFile::new("b.png", vec![3]),
        );
        assert_eq!(mgr.prepare(reserved).await.unwrap_err().kind(), "invalid_upload");

        let empty = JobInputs::from_uploads(
            UploadedFile::new("dir/", vec![1]),
            UploadedFile::new("a.png", vec![2]),
            UploadedFile::new("b.png", vec![3]),
        );
        assert_eq!(mgr.prepare(empty).await.unwrap_err().kind(), "invalid_upload");
    }

    #[tokio::test]
    async fn test_existing_workspace_is_io_failure() {
        let root = tempfile::tempdir().unwrap();
        let mgr = manager(root.path());
        let id = JobId::new();
        std::fs::create_dir_all(root.path().join("work").join(id.to_string())).unwrap();

        let err = mgr.prepare_with_id(id, lookup_inputs()).await.unwrap_err();

        assert!(matches!(err, TexturingError::IoFailure { .. }));
        assert!(!root.path().join("out").join(id.to_string()).exists());
    }

    #[tokio::test]
    async fn test_output_collision_removes_workspace() {
        let root = tempfile::tempdir().unwrap();
        let mgr = manager(root.path());
        let id = JobId::new();
        let taken = root.path().join("out").join(id.to_string());
        std::fs::create_dir_all(&taken).unwrap();

        let err = mgr.prepare_with_id(id, lookup_inputs()).await.unwrap_err();

        assert_eq!(err.kind(), "io_failure");
        assert!(!root.path().join("work").join(id.to_string()).exists());
        assert!(taken.is_dir());
    }

    #[tokio::test]
    async fn test_unwritable_root_is_io_failure() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("work");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = manager(root.path()).prepare(lookup_inputs()).await.unwrap_err();
        assert!(matches!(err, TexturingError::IoFailure { .. }));
    }

    #[tokio::test]
    async fn test_distinct_ids_distinct_dirs() {
        let root = tempfile::tempdir().unwrap();
        let mgr = manager(root.path());

        let a = mgr.prepare(lookup_inputs()).await.unwrap();
        let b = mgr.prepare(lookup_inputs()).await.unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.dir(), b.dir());
    }
}
