//! Job identity and the immutable job description.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// File name of the rendered output inside a job's output directory.
pub const OUTPUT_FILE_NAME: &str = "result.glb";

/// File name of the merged process log inside a job's workspace.
pub const LOG_FILE_NAME: &str = "process.log";

/// Opaque, globally unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(crate::utils::generate_uuid())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A prepared render job.
///
/// Created once by the workspace manager and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// The job identifier.
    pub id: JobId,
    /// The exclusive workspace directory.
    pub workspace_dir: PathBuf,
    /// Model geometry input.
    pub model_path: PathBuf,
    /// Top-surface texture input.
    pub top_texture_path: PathBuf,
    /// Side-surface texture input.
    pub side_texture_path: PathBuf,
    /// Where the render tool writes its result.
    pub output_path: PathBuf,
    /// Where the merged process output goes.
    pub log_path: PathBuf,
    /// Execution timeout bound.
    pub timeout: Duration,
}

impl Job {
    /// Returns the job's output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        self.output_path.parent().unwrap_or(&self.output_path)
    }

    /// Returns the sidecar status artifact path for this job.
    #[must_use]
    pub fn status_artifact_path(&self) -> PathBuf {
        crate::status::status_artifact_path(&self.output_path)
    }
}
