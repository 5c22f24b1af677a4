//! Autonomous animated layers.
//!
//! Scatter layers are created once and animate declaratively from their
//! per-entity delays. Sparkles and shooting stars drive themselves from the
//! event loop and hand back an [`AnimationHandle`](crate::AnimationHandle).

pub mod scatter;
pub mod shooting_star;
pub mod sparkle;
