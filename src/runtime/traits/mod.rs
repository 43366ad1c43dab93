// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ContainerOps, ImageOps, RuntimeInfo and the combined ContainerRuntime.

mod container;
mod image;
mod runtime_info;
pub(crate) mod sealed;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use image::{ImageError, ImageOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::{ContainerInfo, env_key};

/// Every capability the stage controller needs from an engine.
///
/// Implemented automatically for any type implementing all capability traits.
pub trait ContainerRuntime: ContainerOps + ImageOps + RuntimeInfo {}

impl<T> ContainerRuntime for T where T: ContainerOps + ImageOps + RuntimeInfo {}
