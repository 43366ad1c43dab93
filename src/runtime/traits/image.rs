// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Best-effort existence check and pull with live progress.

use super::sealed::Sealed;
use async_trait::async_trait;

/// Image operations: check existence, pull.
#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Check if an image exists locally. Any failure reads as "missing".
    async fn image_exists(&self, reference: &str) -> bool;

    /// Pull an image from a registry, streaming progress to stdout.
    async fn pull_image(&self, reference: &str) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to pull {image}: {reason}")]
    PullFailed { image: String, reason: String },
}
