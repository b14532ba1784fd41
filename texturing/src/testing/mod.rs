//! Testing utilities.
//!
//! [`ScriptedExecutor`] replaces the render tool so orchestration can be
//! exercised without spawning processes. The fixtures build configurations,
//! inputs and repositories for tests.

mod fixtures;
mod scripted;

pub use fixtures::{
    sample_inputs, seeded_repository, test_config, KNOWN_DATE_ID, KNOWN_SHIP_ID, TEST_BASE_URL,
};
#[cfg(unix)]
pub use fixtures::write_script;
pub use scripted::{ScriptedExecutor, ScriptedRun};
