//! The sidecar status artifact written by the render tool.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The `status` value that marks a successful render.
pub const STATUS_SUCCESS: &str = "success";

/// Extension that replaces the output artifact's extension.
pub const STATUS_EXTENSION: &str = "status.json";

/// Returns the status artifact path for an output artifact.
///
/// `/out/<job>/result.glb` becomes `/out/<job>/result.status.json`.
#[must_use]
pub fn status_artifact_path(output_path: &Path) -> PathBuf {
    output_path.with_extension(STATUS_EXTENSION)
}

/// The record the render tool leaves next to its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusArtifact {
    /// `"success"` or any other value for failure.
    pub status: String,
    /// Human-readable text, copied verbatim into the job result.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    /// Output path echoed back by the tool on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// Traceback the tool attaches on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl StatusArtifact {
    /// Creates a success artifact.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            model_path: None,
            traceback: None,
        }
    }

    /// Creates an artifact with an arbitrary status.
    #[must_use]
    pub fn with_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            model_path: None,
            traceback: None,
        }
    }

    /// Returns true if the tool reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Parses an artifact from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Why a status artifact could not be used.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No artifact at the expected path.
    #[error("status artifact missing: {}", .0.display())]
    Missing(PathBuf),

    /// The artifact exists but could not be read.
    #[error("status artifact unreadable: {0}")]
    Unreadable(#[source] std::io::Error),

    /// The artifact is not a valid status record.
    #[error("status artifact malformed: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Reads and parses the status artifact at `path`.
pub async fn read_status_artifact(path: &Path) -> Result<StatusArtifact, ArtifactError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ArtifactError::Missing(path.to_path_buf()));
        }
        Err(e) => return Err(ArtifactError::Unreadable(e)),
    };
    StatusArtifact::from_slice(&bytes).map_err(ArtifactError::Malformed)
}
