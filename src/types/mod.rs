// ABOUTME: Type-safe identifiers shared by the runtimes and stage controller.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;

pub use id::{ContainerId, ContainerMarker, Id};
