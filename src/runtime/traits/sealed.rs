// ABOUTME: Sealed trait pattern for runtime traits.
// ABOUTME: Only the engines in this crate (and test fakes) implement the runtime traits.

/// Sealed trait to prevent external implementations.
///
/// Only types that implement Sealed (the bollard and nerdctl engines) can
/// implement the runtime traits.
pub trait Sealed {}
