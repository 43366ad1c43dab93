// ABOUTME: Container operations trait for container runtimes.
// ABOUTME: Inspect the container we run in and launch detached siblings.

use super::sealed::Sealed;
use super::shared_types::ContainerInfo;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Container operations needed to replicate the current container.
#[async_trait]
pub trait ContainerOps: Sealed + Send + Sync {
    /// Describe the container identified by `self_id`, normally the
    /// current host name.
    async fn inspect_self(&self, self_id: &ContainerId) -> Result<ContainerInfo, ContainerError>;

    /// Create and start a detached container. Returns once the engine has
    /// accepted the start; never waits for the container itself.
    async fn run_container(&self, info: &ContainerInfo) -> Result<ContainerId, ContainerError>;
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("failed to inspect container {id}: {reason}")]
    Inspection { id: String, reason: String },

    #[error("failed to parse inspect output: {0}")]
    Parse(String),

    #[error("failed to launch container from {image}: {reason}")]
    Launch { image: String, reason: String },
}

impl ContainerError {
    /// Whether this error happened while describing a container rather than
    /// launching one. Parse failures count as inspection failures.
    pub fn is_inspection(&self) -> bool {
        !matches!(self, ContainerError::Launch { .. })
    }
}
