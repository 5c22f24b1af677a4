//! Pure transform math for pointer-tracked effects.
//!
//! Nothing here touches a surface: each function maps a pointer position and
//! a per-element coefficient to a [`Transform`], and [`Transform`] renders to
//! a CSS-style transform string. Non-finite intermediate values collapse to
//! the identity so a bad measurement never reaches a style.

use std::fmt;

use glimmer_core::{Point, Rect, Size};

/// Scale that accompanies every parallax translation.
pub const PARALLAX_SCALE: f64 = 1.1;

/// Per-index depth step for solar-system planets.
const PLANET_DEPTH_STEP: f64 = 0.01;

/// A 2D translation in viewport units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shift {
    pub x: f64,
    pub y: f64,
}

impl Shift {
    pub const ZERO: Shift = Shift { x: 0.0, y: 0.0 };

    fn finite_or_zero(x: f64, y: f64) -> Shift {
        if x.is_finite() && y.is_finite() {
            Shift {
                x: normalize(x),
                y: normalize(y),
            }
        } else {
            Shift::ZERO
        }
    }
}

/// Rotation about the X and Y axes, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tilt {
    pub angle_x: f64,
    pub angle_y: f64,
}

impl Tilt {
    pub const ZERO: Tilt = Tilt {
        angle_x: 0.0,
        angle_y: 0.0,
    };
}

/// Point the tilt offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFrame {
    /// Centre of the element's bounding box.
    ElementCenter,
    /// Centre of the viewport (viewport-relative normalized offset).
    ViewportCenter,
}

/// Parameters of the tilt transform family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltConfig {
    /// Offset units per degree of rotation.
    pub divisor: f64,
    /// Extra `translateZ` applied with the rotation.
    pub depth_translation: Option<f64>,
    pub perspective: Option<f64>,
    pub reference: ReferenceFrame,
    /// Reverse the rotation sense.
    pub invert: bool,
}

impl TiltConfig {
    /// Cursor-interactive elements: rotate around their own centre.
    pub const INTERACTIVE: TiltConfig = TiltConfig {
        divisor: 30.0,
        depth_translation: None,
        perspective: None,
        reference: ReferenceFrame::ElementCenter,
        invert: false,
    };

    /// Cards: follow the viewport offset and lift off the page.
    ///
    /// The offset is taken from the viewport centre, not the card's own, so
    /// every card on the page leans the same way for a given pointer.
    pub const CARD: TiltConfig = TiltConfig {
        divisor: 20.0,
        depth_translation: Some(20.0),
        perspective: Some(1000.0),
        reference: ReferenceFrame::ViewportCenter,
        invert: true,
    };

    pub fn with_divisor(self, divisor: f64) -> Self {
        Self { divisor, ..self }
    }
}

/// Parse a depth marker. Anything that is not a finite number means no effect.
pub fn parse_depth(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(0.0)
}

/// Depth of the planet at `index` in an orbital system.
pub fn planet_depth(index: usize) -> f64 {
    PLANET_DEPTH_STEP * (index as f64 + 1.0) * 0.5
}

/// Parallax offset: pointer displacement from the viewport centre scaled by `depth`.
pub fn parallax_shift(pointer: Point, viewport: Size, depth: f64) -> Shift {
    if !depth.is_finite() || !pointer.is_finite() || viewport.is_empty() {
        return Shift::ZERO;
    }
    let center = viewport.center();
    Shift::finite_or_zero((pointer.x - center.x) * depth, (pointer.y - center.y) * depth)
}

/// Tilt angles for an element with bounding box `element`.
///
/// A degenerate element box (or, for the viewport frame, an empty viewport)
/// yields [`Tilt::ZERO`].
pub fn tilt(pointer: Point, element: Rect, viewport: Size, config: &TiltConfig) -> Tilt {
    if element.is_degenerate()
        || !pointer.is_finite()
        || !config.divisor.is_finite()
        || config.divisor == 0.0
    {
        return Tilt::ZERO;
    }
    let reference = match config.reference {
        ReferenceFrame::ElementCenter => element.center(),
        ReferenceFrame::ViewportCenter => {
            if viewport.is_empty() {
                return Tilt::ZERO;
            }
            viewport.center()
        }
    };
    let dx = pointer.x - reference.x;
    let dy = pointer.y - reference.y;
    let sign = if config.invert { -1.0 } else { 1.0 };
    let angle_x = sign * dy / config.divisor;
    let angle_y = sign * -dx / config.divisor;
    if !(angle_x.is_finite() && angle_y.is_finite()) {
        return Tilt::ZERO;
    }
    Tilt {
        angle_x: normalize(angle_x),
        angle_y: normalize(angle_y),
    }
}

/// A composed element transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    perspective: Option<f64>,
    translate: Option<Shift>,
    /// Whether the translation is written as `translate3d`.
    translate_3d: bool,
    rotation: Option<Tilt>,
    translate_z: Option<f64>,
    scale: Option<f64>,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        perspective: None,
        translate: None,
        translate_3d: false,
        rotation: None,
        translate_z: None,
        scale: None,
    };

    /// `translate3d(x, y, 0) scale3d(1.1, 1.1, 1.1)`.
    pub fn parallax(shift: Shift) -> Self {
        Self {
            translate: Some(shift),
            translate_3d: true,
            scale: Some(PARALLAX_SCALE),
            ..Self::IDENTITY
        }
    }

    /// Plain `translate(x, y)`.
    pub fn translate(shift: Shift) -> Self {
        Self {
            translate: Some(shift),
            ..Self::IDENTITY
        }
    }

    pub fn tilt(tilt: Tilt, config: &TiltConfig) -> Self {
        Self {
            perspective: config.perspective,
            rotation: Some(tilt),
            translate_z: config.depth_translation,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn translation(&self) -> Shift {
        self.translate.unwrap_or(Shift::ZERO)
    }

    pub fn rotation(&self) -> Tilt {
        self.rotation.unwrap_or(Tilt::ZERO)
    }

    pub fn depth(&self) -> f64 {
        self.translate_z.unwrap_or(0.0)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return f.write_str("none");
        }
        let mut parts: Vec<String> = Vec::new();
        if let Some(p) = self.perspective {
            parts.push(format!("perspective({}px)", num(p)));
        }
        if let Some(shift) = self.translate {
            if self.translate_3d {
                parts.push(format!(
                    "translate3d({}px, {}px, 0)",
                    num(shift.x),
                    num(shift.y)
                ));
            } else {
                parts.push(format!("translate({}px, {}px)", num(shift.x), num(shift.y)));
            }
        }
        if let Some(tilt) = self.rotation {
            parts.push(format!("rotateX({}deg)", num(tilt.angle_x)));
            parts.push(format!("rotateY({}deg)", num(tilt.angle_y)));
        }
        if let Some(z) = self.translate_z {
            parts.push(format!("translateZ({}px)", num(z)));
        }
        if let Some(s) = self.scale {
            let s = num(s);
            parts.push(format!("scale3d({s}, {s}, {s})"));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Turn `-0.0` into `0.0`.
fn normalize(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Round for display, three decimals.
fn num(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    normalize((v * 1000.0).round() / 1000.0)
}
