//! Core types for render jobs.
//!
//! This module contains the fundamental types used throughout the crate:
//! - `JobId` and `Job` - identity and the immutable job description
//! - `JobStatus` and `JobPhase` - caller-visible status and lifecycle phase
//! - `JobResult` - the terminal outcome handed back to callers

mod job;
mod result;
mod status;

pub use job::{Job, JobId, LOG_FILE_NAME, OUTPUT_FILE_NAME};
pub use result::JobResult;
pub use status::{JobPhase, JobStatus};
