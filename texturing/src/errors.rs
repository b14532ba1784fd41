//! Error types for the texturing orchestrator.
//!
//! Every variant here is a preparation-time failure or an execution-time
//! failure. Preparation failures are returned to the submitting caller;
//! execution failures never escape a running job and are folded into a
//! failed [`JobResult`](crate::core::JobResult) instead.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for texturing operations.
#[derive(Debug, Error)]
pub enum TexturingError {
    /// A ship model or texture identifier did not resolve.
    #[error("{resource} not found: {id}")]
    ResourceNotFound {
        /// The kind of resource that was looked up.
        resource: ResourceKind,
        /// The identifier that missed.
        id: i64,
    },

    /// Creating or writing workspace files failed.
    #[error("IO failure at {}: {source}", path.display())]
    IoFailure {
        /// The path being created or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The render executable could not be started.
    #[error("failed to launch render tool '{}': {source}", executable.display())]
    ProcessLaunchFailure {
        /// The executable that was invoked.
        executable: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An uploaded file carried an unusable name.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// The orchestrator was misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A lookup collaborator failed for reasons other than a miss.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error without path context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The kind of resource a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A ship model geometry blob.
    ShipModel,
    /// A top/side texture pair.
    Texture,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShipModel => write!(f, "ship model"),
            Self::Texture => write!(f, "texture"),
        }
    }
}

impl TexturingError {
    /// Creates a resource-not-found error.
    #[must_use]
    pub fn not_found(resource: ResourceKind, id: i64) -> Self {
        Self::ResourceNotFound { resource, id }
    }

    /// Creates an IO failure bound to a path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a process launch failure.
    #[must_use]
    pub fn launch(executable: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::ProcessLaunchFailure {
            executable: executable.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an invalid upload error.
    #[must_use]
    pub fn invalid_upload(message: impl Into<String>) -> Self {
        Self::InvalidUpload(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a repository error.
    #[must_use]
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository(message.into())
    }

    /// Returns a stable code for logs and events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::IoFailure { .. } | Self::Io(_) => "io_failure",
            Self::ProcessLaunchFailure { .. } => "process_launch_failure",
            Self::InvalidUpload(_) => "invalid_upload",
            Self::Configuration(_) => "configuration",
            Self::Repository(_) => "repository",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Returns true if the error can only occur before a job starts running.
    #[must_use]
    pub fn is_preparation_error(&self) -> bool {
        !matches!(self, Self::ProcessLaunchFailure { .. })
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        let stage = if self.is_preparation_error() { "preparation" } else { "execution" };
        map.insert("stage".to_string(), serde_json::json!(stage));

        match self {
            Self::ResourceNotFound { resource, id } => {
                map.insert("resource".to_string(), serde_json::json!(resource));
                map.insert("id".to_string(), serde_json::json!(id));
            }
            Self::IoFailure { path, .. } => {
                map.insert("path".to_string(), serde_json::json!(path.display().to_string()));
            }
            Self::ProcessLaunchFailure { executable, .. } => {
                map.insert(
                    "executable".to_string(),
                    serde_json::json!(executable.display().to_string()),
                );
            }
            _ => {}
        }

        map
    }
}

impl From<config::ConfigError> for TexturingError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type TexturingResult<T> = Result<T, TexturingError>;
