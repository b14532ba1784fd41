//! Job workspace management.
//!
//! A workspace is the exclusive directory holding a job's inputs and log.
//! Its sibling output directory under the output root receives the render
//! result and the status artifact. Both are named by the job identifier.

mod inputs;
mod manager;

pub use inputs::{
    InputFile, JobInputs, UploadedFile, DEFAULT_MODEL_FILE, DEFAULT_SIDE_TEXTURE_FILE,
    DEFAULT_TOP_TEXTURE_FILE,
};
pub use manager::{Workspace, WorkspaceManager};
