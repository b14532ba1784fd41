//! Job lifecycle events.
//!
//! The orchestrator reports every lifecycle transition to an [`EventSink`]
//! as a dotted event type plus a JSON payload carrying at least `job_id`.

mod kinds;
mod sink;

pub use kinds::JobEventKind;
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};
