//! Cell-level drawing helpers and the pixel/cell mapping.
//!
//! Page geometry is kept in pixels with one cell standing for an 8x16 block,
//! so pointer coefficients keep their web-page feel.

use glimmer_core::{Point, Rect, Size};
use glimmer_effects::Shift;
use ratatui::{buffer::Buffer, layout, style::Style};

pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Braille dots per cell, horizontally and vertically.
pub const DOTS_X: f64 = 2.0;
pub const DOTS_Y: f64 = 4.0;

/// Pixel size of a terminal area.
pub fn viewport(area: layout::Rect) -> Size {
    Size::new(
        area.width as f64 * CELL_WIDTH,
        area.height as f64 * CELL_HEIGHT,
    )
}

/// Braille canvas size of a terminal area.
pub fn canvas_size(area: layout::Rect) -> Size {
    Size::new(area.width as f64 * DOTS_X, area.height as f64 * DOTS_Y)
}

/// Pixel position of the centre of the cell at `column`, `row` of `area`.
pub fn cell_center(area: layout::Rect, column: u16, row: u16) -> Point {
    Point::new(
        (column.saturating_sub(area.x) as f64 + 0.5) * CELL_WIDTH,
        (row.saturating_sub(area.y) as f64 + 0.5) * CELL_HEIGHT,
    )
}

/// Cell holding a pixel position, relative to the area origin.
pub fn to_cell(point: Point) -> (i32, i32) {
    (
        (point.x / CELL_WIDTH).floor() as i32,
        (point.y / CELL_HEIGHT).floor() as i32,
    )
}

/// The cells a pixel rectangle moved by `shift` covers, clipped to `area`.
pub fn cell_rect(rect: Rect, shift: Shift, area: layout::Rect) -> Option<layout::Rect> {
    let x = ((rect.x + shift.x) / CELL_WIDTH).round();
    let y = ((rect.y + shift.y) / CELL_HEIGHT).round();
    let x0 = x.max(0.0);
    let y0 = y.max(0.0);
    let x1 = (x + (rect.width / CELL_WIDTH).round()).min(area.width as f64);
    let y1 = (y + (rect.height / CELL_HEIGHT).round()).min(area.height as f64);
    if !(x1 > x0 && y1 > y0) {
        return None;
    }
    Some(layout::Rect::new(
        area.x + x0 as u16,
        area.y + y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

/// Write `text` at a cell relative to `area`, clipped to it.
pub fn put(buf: &mut Buffer, area: layout::Rect, column: i32, row: i32, text: &str, style: Style) {
    if column < 0 || row < 0 || column >= area.width as i32 || row >= area.height as i32 {
        return;
    }
    let max_width = (area.width as i32 - column) as usize;
    buf.set_stringn(
        area.x + column as u16,
        area.y + row as u16,
        text,
        max_width,
        style,
    );
}

/// Reset every cell of `rect` and give it `style`.
pub fn blank(buf: &mut Buffer, rect: layout::Rect, style: Style) {
    let rect = rect.intersection(buf.area);
    for position in rect.positions() {
        if let Some(cell) = buf.cell_mut(position) {
            cell.reset();
            cell.set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_rect_clips_to_area() {
        let area = layout::Rect::new(0, 0, 10, 5);
        let rect = Rect::new(-16.0, 0.0, 40.0, 32.0);
        assert_eq!(
            cell_rect(rect, Shift::ZERO, area),
            Some(layout::Rect::new(0, 0, 3, 2))
        );
        let shifted = Shift { x: 80.0, y: 0.0 };
        assert_eq!(cell_rect(rect, shifted, area), Some(layout::Rect::new(8, 0, 2, 2)));
        let gone = Shift { x: 200.0, y: 0.0 };
        assert_eq!(cell_rect(rect, gone, area), None);
    }

    #[test]
    fn test_cell_center_round_trips() {
        let area = layout::Rect::new(0, 0, 80, 24);
        let point = cell_center(area, 12, 7);
        assert_eq!(point, Point::new(100.0, 120.0));
        assert_eq!(to_cell(point), (12, 7));
    }

    #[test]
    fn test_put_ignores_cells_outside() {
        let area = layout::Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        put(&mut buf, area, -1, 0, "x", Style::new());
        put(&mut buf, area, 2, 1, "abcdef", Style::new());
        put(&mut buf, area, 0, 5, "y", Style::new());
        assert_eq!(buf, Buffer::with_lines(["    ", "  ab"]));
    }
}
