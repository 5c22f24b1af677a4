//! Visual effects for glimmer.
//!
//! This crate provides a single-threaded [`EventLoop`] with a coalescing
//! [`FrameScheduler`] on top, pointer-tracked transforms (parallax, tilt,
//! cursor follower) applied through an [`ElementSurface`], and autonomous
//! layers (scatter fields, canvas sparkles, shooting stars) that drive
//! themselves until their [`AnimationHandle`] is stopped.

mod animation;
mod canvas;
mod error;
mod event_loop;
pub mod layers;
mod pointer;
mod scheduler;
mod surface;
pub mod transform;

pub use animation::AnimationHandle;
pub use canvas::{Canvas2d, CanvasView, DrawList, DrawOp};
pub use error::EffectError;
pub use event_loop::{CallbackId, EventLoop};
pub use pointer::{
    CARD_SELECTOR, CURSOR_SELECTOR, DEPTH_ATTRIBUTE, DEPTH_SELECTOR, HOVER_FLAG, HOVER_SELECTOR,
    INTERACTIVE_SELECTOR, PLANET_SELECTOR, PointerEffects, PointerState, PointerTracker,
    RegisteredElement,
};
pub use scheduler::FrameScheduler;
pub use surface::{ElementSurface, MemorySurface};
pub use transform::{ReferenceFrame, Shift, Tilt, TiltConfig, Transform};
