//! The terminal, caller-visible result of a job.

use super::JobStatus;
use serde::{Deserialize, Serialize};

/// Outcome of a render job.
///
/// A success always carries a model URL; a failure never does. Construct
/// through [`JobResult::success`] and [`JobResult::failure`] to keep that
/// invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    /// Whether a usable model was produced.
    pub success: bool,
    /// Public URL of the rendered model.
    pub model_url: Option<String>,
    /// Human-readable description of the outcome.
    pub message: String,
    /// Terminal status.
    pub status: JobStatus,
}

impl JobResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(model_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            model_url: Some(model_url.into()),
            message: message.into(),
            status: JobStatus::Completed,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            model_url: None,
            message: message.into(),
            status: JobStatus::Failed,
        }
    }

    /// Returns true if the result succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": self.success,
            "modelUrl": self.model_url,
            "message": self.message,
            "status": self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_url() {
        let result = JobResult::success("http://cdn/models/x/result.glb", "ok");
        assert!(result.is_success());
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.model_url.as_deref(), Some("http://cdn/models/x/result.glb"));
    }

    #[test]
    fn test_failure_has_no_url() {
        let result = JobResult::failure("boom");
        assert!(!result.is_success());
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.model_url.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = JobResult::failure("boom");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert!(json["modelUrl"].is_null());
        assert_eq!(json["message"], "boom");
        assert_eq!(json["status"], "failed");
        assert_eq!(json, result.to_json());
    }
}
