// ABOUTME: Application-wide error types for waitdaemon.
// ABOUTME: Maps each failure class to the process exit code callers branch on.

use crate::config::Phase;
use crate::runtime::SelectionError;
use crate::stage::StageError;
use thiserror::Error;

/// Exit code when the first stage fails.
pub const EXIT_FIRST_STAGE_FAILURE: i32 = 1;
/// Exit code when the second stage fails.
pub const EXIT_SECOND_STAGE_FAILURE: i32 = 2;
/// Exit code when no container engine could be selected.
pub const EXIT_SELECTION_FAILURE: i32 = 12;

#[derive(Debug, Error)]
pub enum Error {
    #[error("runtime selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("{phase} stage failed: {source}")]
    Stage {
        phase: Phase,
        #[source]
        source: StageError,
    },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Selection(_) => EXIT_SELECTION_FAILURE,
            Error::Stage {
                phase: Phase::First,
                ..
            } => EXIT_FIRST_STAGE_FAILURE,
            Error::Stage {
                phase: Phase::Second,
                ..
            } => EXIT_SECOND_STAGE_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
