//! The page glimmer draws: named elements on a [`MemorySurface`].
//!
//! Elements are marked the way the effects expect (depth attributes, planet,
//! tilt and cursor classes) and registered once. Resizes only move rects, so
//! element ids stay valid for the life of the scene.

use std::cell::RefCell;
use std::rc::Rc;

use glimmer_config::Config;
use glimmer_core::{Palette, Point, Rect, Size, ThemePreference};
use glimmer_effects::{
    DEPTH_ATTRIBUTE, EventLoop, HOVER_FLAG, MemorySurface, PointerEffects, PointerTracker, Shift,
    TiltConfig, Transform,
};
use ratatui::{
    Frame, layout,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Paragraph, Wrap},
};

use crate::draw::{CELL_HEIGHT, CELL_WIDTH, blank, cell_rect, put, to_cell, viewport};

pub const CARD: &str = "hero-card";
pub const BADGE: &str = "badge";
pub const TOGGLE: &str = "theme-toggle";
pub const CURSOR: &str = "cursor";

const PLANETS: [(&str, &[&str]); 3] = [
    ("planet-0", &["●"]),
    ("planet-1", &["◢◣", "◥◤"]),
    ("planet-2", &["  ▄▄▄  ", "━█████━", "  ▀▀▀  "]),
];

/// Horizon bands drawn by the depth layers, far to near.
const BANDS: [&str; 3] = ["  ·   ˚    ·  ", " ▁▂▃▂▁   ▁▂▁  ", "▂▃▅▆▅▃▂▁▂▃▄▃▂▁"];

/// Sizes in cells.
const CARD_SIZE: (f64, f64) = (46.0, 9.0);
const BADGE_SIZE: (f64, f64) = (22.0, 3.0);
const TOGGLE_SIZE: (f64, f64) = (14.0, 3.0);

/// How far the toggle grows on each side, in cells.
const HOVER_GROW: f64 = 1.0;
const PULSE_GROW: f64 = 2.0;

/// How far a tilted element leans, in cells per degree.
const LEAN_X: f64 = 0.25;
const LEAN_Y: f64 = 0.125;

/// State of the theme toggle control as the scene draws it.
#[derive(Debug, Clone, Copy)]
pub struct ToggleState {
    pub theme: ThemePreference,
    pub pulsing: bool,
}

#[derive(Debug)]
pub struct Scene {
    surface: Rc<RefCell<MemorySurface>>,
    tracker: PointerTracker,
    layers: Vec<String>,
    pointer_seen: bool,
}

impl Scene {
    pub fn new(event_loop: &EventLoop, config: &Config) -> Self {
        let mut surface = MemorySurface::new(Size::default());
        let mut layers = Vec::new();
        for (i, depth) in config.parallax_depths.iter().enumerate() {
            let name = format!("layer-{i}");
            surface.insert(
                &name,
                &["layer"],
                &[(DEPTH_ATTRIBUTE, &depth.to_string())],
                Rect::default(),
            );
            layers.push(name);
        }
        for (name, _) in PLANETS {
            surface.insert(name, &["planet"], &[], Rect::default());
        }
        surface.insert(BADGE, &["cursor-interactive"], &[], Rect::default());
        surface.insert(CARD, &["card-parallax"], &[], Rect::default());
        surface.insert(TOGGLE, &["button"], &[], Rect::default());
        surface.insert(CURSOR, &["custom-cursor"], &[], Rect::default());

        let effects = PointerEffects::register_with(
            &surface,
            TiltConfig::INTERACTIVE.with_divisor(config.tilt_divisor),
            TiltConfig::CARD.with_divisor(config.card_tilt_divisor),
        );
        let surface = Rc::new(RefCell::new(surface));
        let tracker = PointerTracker::new(event_loop, effects, surface.clone());
        Self {
            surface,
            tracker,
            layers,
            pointer_seen: false,
        }
    }

    /// Lay the page out for a terminal area. Effects are re-applied once the
    /// pointer has been seen.
    pub fn resize(&mut self, area: layout::Rect) {
        let size = viewport(area);
        {
            let mut surface = self.surface.borrow_mut();
            surface.set_viewport(size);
            for name in &self.layers {
                surface.set_rect(name, Rect::from_size(size));
            }
            for (i, (name, sprite)) in PLANETS.iter().enumerate() {
                let width = sprite.iter().map(|l| l.chars().count()).max().unwrap_or(1);
                surface.set_rect(
                    name,
                    Rect::new(
                        size.width * (0.62 + 0.1 * i as f64),
                        size.height * (0.12 + 0.08 * i as f64),
                        width as f64 * CELL_WIDTH,
                        sprite.len() as f64 * CELL_HEIGHT,
                    ),
                );
            }
            surface.set_rect(BADGE, cells(2.0, 2.0, BADGE_SIZE));
            surface.set_rect(
                CARD,
                Rect::new(
                    ((size.width - CARD_SIZE.0 * CELL_WIDTH) / 2.0).max(0.0),
                    ((size.height - CARD_SIZE.1 * CELL_HEIGHT) / 2.0).max(0.0),
                    CARD_SIZE.0 * CELL_WIDTH,
                    CARD_SIZE.1 * CELL_HEIGHT,
                ),
            );
            let toggle_column = (area.width as f64 - TOGGLE_SIZE.0 - 2.0).max(0.0);
            surface.set_rect(TOGGLE, cells(toggle_column, 1.0, TOGGLE_SIZE));
            surface.set_rect(CURSOR, cells(0.0, 0.0, (1.0, 1.0)));
        }
        if self.pointer_seen {
            self.tracker.refresh();
        }
    }

    pub fn on_pointer_move(&mut self, point: Point) {
        self.pointer_seen = true;
        self.tracker.on_pointer_move(point);
    }

    /// Whether the pointer rests on the toggle as of the last effects frame.
    pub fn toggle_hovered(&self) -> bool {
        self.pointer_seen
            && self.surface.borrow().has_flag(CURSOR, HOVER_FLAG)
            && self.hit(TOGGLE, self.tracker.pointer())
    }

    /// Whether `point` falls on the named element.
    pub fn hit(&self, name: &str, point: Point) -> bool {
        self.surface
            .borrow()
            .rect_of(name)
            .is_some_and(|rect| rect.contains(point))
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: layout::Rect,
        palette: &Palette,
        toggle: ToggleState,
    ) {
        let hovered = self.toggle_hovered();
        let surface = self.surface.borrow();
        let buf = frame.buffer_mut();

        for (i, name) in self.layers.iter().enumerate() {
            let shift = shift_of(&surface, name);
            let band = BANDS[i % BANDS.len()];
            let row = area.height as i32 - 2 - (self.layers.len() - 1 - i) as i32 * 2;
            let (dx, dy) = to_cell(Point::new(shift.x, shift.y));
            let alpha = 0.35 + 0.5 * (i + 1) as f32 / self.layers.len() as f32;
            let shade = palette.muted.with_alpha(alpha).over(palette.background);
            let style = Style::new().fg(shade.to_color());
            let width = band.chars().count() as i32;
            let offset = dx.rem_euclid(width);
            let mut column = offset - width;
            while column < area.width as i32 {
                put(buf, area, column, row + dy, band, style);
                column += width;
            }
        }

        for (i, (name, sprite)) in PLANETS.iter().enumerate() {
            let Some(rect) = surface.rect_of(name) else {
                continue;
            };
            let shift = shift_of(&surface, name);
            let (column, row) = to_cell(Point::new(rect.x + shift.x, rect.y + shift.y));
            let hue = 20.0 + 110.0 * i as f32;
            let style = Style::new().fg(glimmer_core::hsl_to_rgb(hue, 0.6, 0.6).to_color());
            for (line, text) in sprite.iter().enumerate() {
                put(buf, area, column, row + line as i32, text, style);
            }
        }

        let panel = Style::new()
            .bg(palette.background.to_color())
            .fg(palette.foreground.to_color());

        if let Some((rect, transform)) = placed(&surface, BADGE) {
            let tilt = transform.rotation();
            if let Some(cells) = cell_rect(rect, lean(&transform), area) {
                blank(buf, cells, panel);
                let text = format!("tilt {:+.1}° {:+.1}°", tilt.angle_x, tilt.angle_y);
                frame.render_widget(
                    Paragraph::new(text).style(panel).block(
                        Block::bordered()
                            .border_type(BorderType::Rounded)
                            .border_style(Style::new().fg(palette.accent.to_color())),
                    ),
                    cells,
                );
            }
        }

        let buf = frame.buffer_mut();
        if let Some((rect, transform)) = placed(&surface, CARD) {
            if transform.depth() > 0.0 {
                let drop = Shift {
                    x: CELL_WIDTH,
                    y: CELL_HEIGHT / 2.0,
                };
                if let Some(shadow) = cell_rect(rect, drop, area) {
                    let shade = palette.foreground.with_alpha(0.12).over(palette.background);
                    blank(buf, shadow, Style::new().bg(shade.to_color()));
                }
            }
            if let Some(cells) = cell_rect(rect, lean(&transform), area) {
                blank(frame.buffer_mut(), cells, panel);
                let title = Style::new()
                    .fg(palette.accent.to_color())
                    .add_modifier(Modifier::BOLD);
                let detail = Style::new().fg(palette.muted.to_color());
                let lines = vec![
                    Line::from("glimmer").style(title),
                    Line::from("parallax, sparkles and shooting stars"),
                    Line::from(""),
                    Line::from(transform.to_string()).style(detail),
                ];
                frame.render_widget(
                    Paragraph::new(lines)
                        .style(panel)
                        .centered()
                        .wrap(Wrap { trim: true })
                        .block(
                            Block::bordered()
                                .border_type(BorderType::Double)
                                .border_style(Style::new().fg(palette.accent.to_color())),
                        ),
                    cells,
                );
            }
        }

        if let Some(rect) = surface.rect_of(TOGGLE) {
            let grow_cells = if toggle.pulsing {
                PULSE_GROW
            } else if hovered {
                HOVER_GROW
            } else {
                0.0
            };
            let grow = grow_cells * CELL_WIDTH;
            let rect = Rect::new(rect.x - grow, rect.y, rect.width + 2.0 * grow, rect.height);
            if let Some(cells) = cell_rect(rect, Shift::ZERO, area) {
                let label = match toggle.theme {
                    ThemePreference::Dark => "☾ dark",
                    ThemePreference::Light => "☀ light",
                };
                let mut style = panel;
                if toggle.pulsing {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                blank(frame.buffer_mut(), cells, panel);
                frame.render_widget(
                    Paragraph::new(label).style(style).centered().block(
                        Block::bordered()
                            .border_type(BorderType::Rounded)
                            .border_style(Style::new().fg(palette.accent.to_color())),
                    ),
                    cells,
                );
            }
        }
    }

    /// Draw the custom cursor; last, so it sits above everything.
    pub fn render_cursor(&self, frame: &mut Frame, area: layout::Rect, palette: &Palette) {
        if !self.pointer_seen {
            return;
        }
        let surface = self.surface.borrow();
        let shift = shift_of(&surface, CURSOR);
        let hovering = surface.has_flag(CURSOR, HOVER_FLAG);
        let (column, row) = to_cell(Point::new(shift.x, shift.y));
        let glyph = if hovering { "◉" } else { "◆" };
        let style = Style::new().fg(palette.accent.to_color()).add_modifier(Modifier::BOLD);
        put(frame.buffer_mut(), area, column, row, glyph, style);
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    #[cfg(test)]
    pub fn transform_of(&self, name: &str) -> Option<Transform> {
        self.surface.borrow().transform_of(name)
    }
}

fn cells(column: f64, row: f64, (width, height): (f64, f64)) -> Rect {
    Rect::new(
        column * CELL_WIDTH,
        row * CELL_HEIGHT,
        width * CELL_WIDTH,
        height * CELL_HEIGHT,
    )
}

fn shift_of(surface: &MemorySurface, name: &str) -> Shift {
    surface
        .transform_of(name)
        .map(|t| t.translation())
        .unwrap_or(Shift::ZERO)
}

fn placed(surface: &MemorySurface, name: &str) -> Option<(Rect, Transform)> {
    let rect = surface.rect_of(name)?;
    Some((rect, surface.transform_of(name).unwrap_or(Transform::IDENTITY)))
}

/// Stand-in for a 3D rotation: lean the element towards its raised edge.
fn lean(transform: &Transform) -> Shift {
    let tilt = transform.rotation();
    Shift {
        x: (tilt.angle_y * LEAN_X).round() * CELL_WIDTH,
        y: (-tilt.angle_x * LEAN_Y).round() * CELL_HEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::cell_center;

    fn scene(event_loop: &EventLoop) -> Scene {
        let mut scene = Scene::new(event_loop, &Config::default());
        scene.resize(layout::Rect::new(0, 0, 80, 24));
        scene
    }

    #[test]
    fn test_pointer_move_reaches_elements_next_frame() {
        let event_loop = EventLoop::new();
        let mut scene = scene(&event_loop);
        event_loop.tick(16.0);

        let area = layout::Rect::new(0, 0, 80, 24);
        scene.on_pointer_move(cell_center(area, 79, 0));
        assert!(scene.tracker().scheduler().is_pending());
        event_loop.tick(32.0);

        let layer = scene.transform_of("layer-2").unwrap();
        assert!(layer.translation().x > 0.0);
        assert!(layer.translation().y < 0.0);
        let card = scene.transform_of(CARD).unwrap();
        assert!(card.to_string().starts_with("perspective(1000px) rotateX("));
        let cursor = scene.transform_of(CURSOR).unwrap();
        assert_eq!(cursor.translation(), Shift { x: 636.0, y: 8.0 });
    }

    #[test]
    fn test_toggle_hit_test() {
        let event_loop = EventLoop::new();
        let scene = scene(&event_loop);
        let area = layout::Rect::new(0, 0, 80, 24);
        assert!(scene.hit(TOGGLE, cell_center(area, 70, 2)));
        assert!(!scene.hit(TOGGLE, cell_center(area, 10, 2)));
    }

    fn toggle_corner(scene: &Scene) -> String {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let palette = ThemePreference::Light.palette();
        let toggle = ToggleState {
            theme: ThemePreference::Light,
            pulsing: false,
        };
        terminal
            .draw(|frame| {
                let area = frame.area();
                scene.render(frame, area, &palette, toggle);
            })
            .unwrap();
        terminal.backend().buffer()[(63, 1)].symbol().to_string()
    }

    #[test]
    fn test_toggle_grows_while_hovered() {
        let event_loop = EventLoop::new();
        let mut scene = scene(&event_loop);
        let area = layout::Rect::new(0, 0, 80, 24);

        scene.on_pointer_move(cell_center(area, 10, 20));
        event_loop.tick(16.0);
        assert!(!scene.toggle_hovered());
        assert_ne!(toggle_corner(&scene), "╭");

        scene.on_pointer_move(cell_center(area, 70, 2));
        assert!(!scene.toggle_hovered());
        event_loop.tick(32.0);
        assert!(scene.toggle_hovered());
        assert_eq!(toggle_corner(&scene), "╭");
    }

    #[test]
    fn test_render_draws_card() {
        let event_loop = EventLoop::new();
        let scene = scene(&event_loop);
        event_loop.tick(16.0);
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let palette = ThemePreference::Dark.palette();
        let toggle = ToggleState {
            theme: ThemePreference::Dark,
            pulsing: true,
        };
        terminal
            .draw(|frame| {
                let area = frame.area();
                scene.render(frame, area, &palette, toggle);
                scene.render_cursor(frame, area, &palette);
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("glimmer"));
        assert!(text.contains("dark"));
    }
}
