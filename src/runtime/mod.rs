// ABOUTME: Container runtime abstraction with Docker API and nerdctl CLI engines.
// ABOUTME: Selects an engine from an explicit preference or by probing.

mod bollard;
mod detection;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod nerdctl;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{
    DOCKER_SOCKET, DefaultEngines, EngineFactory, PING_TIMEOUT, cli_command, select_runtime,
};
pub use error::{SelectionError, SelectionErrorKind};
pub use nerdctl::NerdctlRuntime;
pub use traits::{
    ContainerError, ContainerInfo, ContainerOps, ContainerRuntime, ImageError, ImageOps,
    RuntimeInfo, RuntimeInfoError,
};
pub use types::{RuntimeConfig, RuntimePreference, UnknownPreference};
