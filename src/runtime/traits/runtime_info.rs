// ABOUTME: Runtime info trait for container runtimes.
// ABOUTME: Engine name, liveness ping and resource release.

use super::sealed::Sealed;
use async_trait::async_trait;

/// Engine metadata and lifecycle.
#[async_trait]
pub trait RuntimeInfo: Sealed + Send + Sync {
    /// Short engine name for logs, e.g. `docker` or `nerdctl`.
    fn name(&self) -> &'static str;

    /// Ping the runtime to check connectivity.
    ///
    /// Engines without a liveness check are always considered reachable.
    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        Ok(())
    }

    /// Release engine resources. Consumes the engine.
    fn close(self: Box<Self>) -> Result<(), RuntimeInfoError>;
}

/// Errors from runtime info operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeInfoError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
