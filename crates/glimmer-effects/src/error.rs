//! Errors raised by effect surfaces.

/// Failures an effect contains at the smallest boundary it can.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// The element left the surface after it was registered.
    #[error("element {0} is no longer attached")]
    Detached(String),
    /// A required container is absent from the surface.
    #[error("container {0:?} not found")]
    MissingContainer(String),
}
