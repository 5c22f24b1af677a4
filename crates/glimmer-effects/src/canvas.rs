//! 2D drawing capability and a recording canvas rendered through ratatui.

use glimmer_core::{Point, Rect, Rgba, Size};
use ratatui::{
    buffer::Buffer,
    layout,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Circle, Points},
    },
};

/// The drawing primitives the canvas layers need.
pub trait Canvas2d {
    fn size(&self) -> Size;

    fn clear(&mut self, region: Rect);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
}

/// A recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
}

/// Canvas that records circles for the current frame.
///
/// Clearing a region drops every recorded circle whose centre lies in it, so
/// after a full clear the list holds exactly what the next frame draws.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Size,
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Borrow as a widget painting on `background`.
    pub fn view(&self, background: Rgba) -> CanvasView<'_> {
        CanvasView {
            list: self,
            background,
        }
    }
}

impl Canvas2d for DrawList {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, region: Rect) {
        // Circles drawn before a shrink can sit outside the surface.
        if region.x <= 0.0
            && region.y <= 0.0
            && region.x + region.width >= self.size.width
            && region.y + region.height >= self.size.height
        {
            self.ops.clear();
            return;
        }
        // Far edges are inclusive.
        let covers = |p: &Point| {
            p.x >= region.x
                && p.x <= region.x + region.width
                && p.y >= region.y
                && p.y <= region.y + region.height
        };
        self.ops.retain(|op| match op {
            DrawOp::Circle { center, .. } => !covers(center),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        if !center.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return;
        }
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }
}

/// Renders a [`DrawList`] with braille dots, origin top-left.
#[derive(Debug)]
pub struct CanvasView<'a> {
    list: &'a DrawList,
    background: Rgba,
}

impl Widget for CanvasView<'_> {
    fn render(self, area: layout::Rect, buf: &mut Buffer) {
        let size = self.list.size;
        if size.is_empty() || area.is_empty() {
            return;
        }
        let background = self.background;
        Canvas::default()
            .background_color(background.to_color())
            .marker(Marker::Braille)
            .x_bounds([0.0, size.width])
            .y_bounds([0.0, size.height])
            .paint(|ctx| {
                for op in self.list.ops() {
                    let DrawOp::Circle {
                        center,
                        radius,
                        color,
                    } = *op;
                    let color: Color = color.over(background).to_color();
                    // Canvas y grows upwards.
                    let y = size.height - center.y;
                    if radius < 1.5 {
                        ctx.draw(&Points {
                            coords: &[(center.x, y)],
                            color,
                        });
                    } else {
                        ctx.draw(&Circle {
                            x: center.x,
                            y,
                            radius: radius - 1.0,
                            color,
                        });
                        ctx.draw(&Points {
                            coords: &[(center.x, y)],
                            color,
                        });
                    }
                }
            })
            .render(area, buf);
    }
}
