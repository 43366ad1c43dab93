// ABOUTME: Error types for stage execution.
// ABOUTME: Separates pull, inspection and launch failures.

use crate::runtime::{ContainerError, ImageError};

/// Errors that end a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// The target image could not be pulled.
    #[error("image pull failed: {source}")]
    Pull {
        image: String,
        #[source]
        source: ImageError,
    },

    /// Our own container could not be identified or described.
    #[error("inspection failed: {0}")]
    Inspect(#[source] ContainerError),

    /// The next container could not be created or started.
    #[error("launch failed: {0}")]
    Launch(#[source] ContainerError),
}

impl From<ContainerError> for StageError {
    fn from(err: ContainerError) -> Self {
        if err.is_inspection() {
            StageError::Inspect(err)
        } else {
            StageError::Launch(err)
        }
    }
}
