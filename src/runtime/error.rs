// ABOUTME: Runtime selection error types with SNAFU pattern.
// ABOUTME: Unifies preference, connection and liveness failures for programmatic handling.

use snafu::Snafu;

use super::traits::RuntimeInfoError;
use super::types::UnknownPreference;

/// No usable engine could be selected.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SelectionError {
    #[snafu(display("{source}"))]
    Preference { source: UnknownPreference },

    #[snafu(display("docker runtime unavailable: {source}"))]
    Docker { source: RuntimeInfoError },

    #[snafu(display("container CLI `{cli}` unavailable: {source}"))]
    Cli {
        cli: String,
        source: RuntimeInfoError,
    },

    #[snafu(display("no container runtime found: checked Docker API ({docker}) and CLI ({cli})"))]
    NoRuntimeFound { docker: String, cli: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionErrorKind {
    /// The preference string was not recognised. Nothing was constructed.
    UnknownPreference,
    /// The explicitly requested engine could not be reached.
    Unavailable,
    /// Auto-detection exhausted every engine.
    NoRuntimeFound,
}

impl SelectionError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> SelectionErrorKind {
        match self {
            SelectionError::Preference { .. } => SelectionErrorKind::UnknownPreference,
            SelectionError::Docker { .. } | SelectionError::Cli { .. } => {
                SelectionErrorKind::Unavailable
            }
            SelectionError::NoRuntimeFound { .. } => SelectionErrorKind::NoRuntimeFound,
        }
    }
}

impl From<UnknownPreference> for SelectionError {
    fn from(source: UnknownPreference) -> Self {
        SelectionError::Preference { source }
    }
}
