//! Status artifact handling and result resolution.

mod artifact;
mod resolver;

pub use artifact::{
    read_status_artifact, status_artifact_path, ArtifactError, StatusArtifact, STATUS_EXTENSION,
    STATUS_SUCCESS,
};
pub use resolver::{StatusResolver, EXECUTION_FAILED_MESSAGE};
