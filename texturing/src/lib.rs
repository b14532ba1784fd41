//! # Texturing
//!
//! Asynchronous orchestration of external texturing render jobs.
//!
//! A job takes a ship model and a top/side texture pair, stages them in an
//! exclusive workspace, runs an external render tool against them under a
//! hard timeout, and reports a single [`JobResult`](core::JobResult):
//!
//! - **Workspace preparation**: inputs come from repositories or uploads
//! - **Process execution**: fixed positional contract, merged log, forced kill
//! - **Status resolution**: exit code and a sidecar status artifact decide
//! - **Event-driven observability**: lifecycle events and structured logs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use texturing::prelude::*;
//!
//! let config = TexturingConfig::from_env()?;
//! let orchestrator = JobOrchestrator::from_config(config)?
//!     .with_repository(Arc::new(repository));
//!
//! let handle = orchestrator.submit_by_ids(ship_id, date_id).await?;
//! let result = handle.await;
//! println!("{}", result.to_json());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod executor;
pub mod observability;
pub mod orchestrator;
pub mod registry;
pub mod repository;
pub mod status;
pub mod testing;
pub mod utils;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::TexturingConfig;
    pub use crate::core::{Job, JobId, JobPhase, JobResult, JobStatus};
    pub use crate::errors::{ResourceKind, TexturingError, TexturingResult};
    pub use crate::events::{
        CollectingEventSink, EventSink, JobEventKind, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::executor::{CommandExecutor, ProcessExecutor, ProcessOutcome, RenderCommand};
    pub use crate::observability::{init_tracing, LogFormat, SpanTimer};
    pub use crate::orchestrator::{JobHandle, JobOrchestrator};
    pub use crate::registry::{JobRegistry, JobSnapshot};
    pub use crate::repository::{
        InMemoryRepository, ShipModelRepository, TextureBytes, TextureRepository,
    };
    pub use crate::status::{StatusArtifact, StatusResolver};
    pub use crate::utils::{generate_uuid, iso_timestamp, Timestamp};
    pub use crate::workspace::{JobInputs, UploadedFile, WorkspaceManager};
}
