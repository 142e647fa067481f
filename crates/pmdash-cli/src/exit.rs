//! Process exit codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: a report or option list was written |
//! | 1 | Failure: no row matched, or an input/config/render error |

use std::process;

/// Exit code for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    /// Failure when the filters left nothing to show.
    pub fn from_match_count(count: usize) -> Self {
        if count == 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}
