//! Core types shared by the glimmer crates.
//!
//! Geometry in viewport coordinates, colours and the persisted theme
//! preference live here so that the effects, the configuration layer and
//! the terminal host agree on one vocabulary.

mod color;
mod geometry;
mod theme;

pub use color::{Rgba, hsl_to_rgb};
pub use geometry::{Point, Rect, Size};
pub use theme::{Palette, ParseThemeError, ThemePreference};
