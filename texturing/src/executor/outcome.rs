//! Process exit outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exit code reported when no real exit code exists (signal or timeout).
pub const NO_EXIT_CODE: i32 = -1;

/// How the render tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// The raw exit code, or [`NO_EXIT_CODE`].
    pub exit_code: i32,
    /// Whether the process was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl ProcessOutcome {
    /// The process exited on its own with `exit_code`.
    #[must_use]
    pub const fn exited(exit_code: i32) -> Self {
        Self {
            exit_code,
            timed_out: false,
        }
    }

    /// The process was forcibly terminated at the timeout bound.
    #[must_use]
    pub const fn killed_on_timeout() -> Self {
        Self {
            exit_code: NO_EXIT_CODE,
            timed_out: true,
        }
    }

    /// Returns true for a zero exit without timeout.
    #[must_use]
    pub const fn is_clean_exit(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.timed_out {
            write!(f, "timed out")
        } else {
            write!(f, "exit code {}", self.exit_code)
        }
    }
}
