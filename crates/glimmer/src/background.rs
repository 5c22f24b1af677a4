//! Scatter fields and shooting stars, drawn cell by cell behind the page.

use std::f64::consts::TAU;

use glimmer_config::Config;
use glimmer_core::{Palette, Point, Rgba, hsl_to_rgb};
use glimmer_effects::layers::scatter::{ScatterLayer, ScatterPoint, ScatterSpec, init_layer};
use glimmer_effects::layers::shooting_star::ShootingStarLayer;
use rand::Rng;
use ratatui::{buffer::Buffer, layout, style::Style};

use crate::draw::{CELL_HEIGHT, CELL_WIDTH, put, to_cell};

/// Star glyphs from faint to bright.
const STAR_CHARS: &[char] = &['·', '+', '*', '✦'];

/// Dust glyphs by size.
const DUST_CHARS: &[char] = &['.', '·', '•'];

/// Shooting-star trail from the head backwards.
const TRAIL_CHARS: &[char] = &['━', '━', '─', '─', '╌', '·'];

const TWINKLE_PERIOD_MS: f64 = 3000.0;
const DUST_PERIOD_MS: f64 = 5000.0;
const DRIFT_PERIOD_MS: f64 = 20_000.0;
/// Largest particle drift, as a fraction of the area.
const DRIFT_AMPLITUDE: f64 = 0.02;

/// The four scatter layers, sampled once at startup.
#[derive(Debug, Default)]
pub struct Starfield {
    stars: ScatterLayer,
    particles: ScatterLayer,
    constellation: ScatterLayer,
    dust: ScatterLayer,
}

impl Starfield {
    pub fn new<R: Rng>(config: &Config, rng: &mut R) -> Self {
        let mut field = Self::default();
        let layers = [
            (&mut field.stars, ScatterSpec::STARS.with_count(config.stars)),
            (&mut field.particles, ScatterSpec::PARTICLES.with_count(config.particles)),
            (
                &mut field.constellation,
                ScatterSpec::CONSTELLATION.with_count(config.constellation_points),
            ),
            (&mut field.dust, ScatterSpec::DUST.with_count(config.dust)),
        ];
        for (layer, spec) in layers {
            if let Err(err) = init_layer(Some(layer), &spec, rng) {
                tracing::warn!(%err, "scatter layer skipped");
            }
        }
        field
    }

    pub fn len(&self) -> usize {
        self.stars.len() + self.particles.len() + self.constellation.len() + self.dust.len()
    }

    pub fn render(
        &self,
        buf: &mut Buffer,
        area: layout::Rect,
        elapsed_ms: f64,
        palette: &Palette,
    ) {
        let bg = palette.background;
        let tint = |color: Rgba, alpha: f64| {
            Style::new().fg(color.with_alpha(alpha as f32).over(bg).to_color())
        };

        for point in self.dust.points() {
            let size = (point.size_px as usize).saturating_sub(1);
            let glyph = DUST_CHARS[size.min(DUST_CHARS.len() - 1)];
            let b = point.brightness(elapsed_ms, DUST_PERIOD_MS);
            let (column, row) = cell_of(point, area);
            let style = tint(palette.muted, 0.2 + 0.4 * b);
            put(buf, area, column, row, &glyph.to_string(), style);
        }

        for point in self.particles.points() {
            let phase = elapsed_ms / DRIFT_PERIOD_MS * TAU + point.y * TAU;
            let drifted = ScatterPoint {
                x: point.x + DRIFT_AMPLITUDE * phase.sin(),
                y: point.y + DRIFT_AMPLITUDE * phase.cos(),
                ..*point
            };
            let (column, row) = cell_of(&drifted, area);
            put(buf, area, column, row, "∙", tint(palette.accent, 0.5));
        }

        let count = self.constellation.len().max(1) as f32;
        for (i, point) in self.constellation.points().iter().enumerate() {
            let hue = 200.0 + 140.0 * i as f32 / count;
            let (column, row) = cell_of(point, area);
            put(buf, area, column, row, "✶", tint(hsl_to_rgb(hue, 0.7, 0.7), 0.9));
        }

        for point in self.stars.points() {
            let b = point.brightness(elapsed_ms, TWINKLE_PERIOD_MS);
            let level = (b * STAR_CHARS.len() as f64) as usize;
            let glyph = STAR_CHARS[level.min(STAR_CHARS.len() - 1)];
            let (column, row) = cell_of(point, area);
            let style = tint(palette.foreground, 0.3 + 0.7 * b);
            put(buf, area, column, row, &glyph.to_string(), style);
        }
    }
}

fn cell_of(point: &ScatterPoint, area: layout::Rect) -> (i32, i32) {
    (
        (point.x * area.width as f64).floor() as i32,
        (point.y * area.height as f64).floor() as i32,
    )
}

/// Draw every star in flight with a fading trail.
pub fn render_shooting_stars<R: Rng>(
    layer: &ShootingStarLayer<R>,
    buf: &mut Buffer,
    area: layout::Rect,
    palette: &Palette,
) {
    let bounds = layer.bounds();
    let bg = palette.background;
    for star in layer.stars() {
        let head = star.position(bounds);
        for (k, glyph) in TRAIL_CHARS.iter().enumerate().rev() {
            let step = (k + 1) as f64;
            let tail = Point::new(head.x - step * CELL_WIDTH, head.y - step * CELL_HEIGHT * 0.15);
            let alpha = 0.8 - 0.12 * k as f32;
            let style = Style::new().fg(palette.foreground.with_alpha(alpha).over(bg).to_color());
            let (column, row) = to_cell(tail);
            put(buf, area, column, row, &glyph.to_string(), style);
        }
        let (column, row) = to_cell(head);
        put(buf, area, column, row, "✦", Style::new().fg(palette.accent.to_color()));
    }
}

#[cfg(test)]
mod tests {
    use glimmer_core::{Size, ThemePreference};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_starfield_follows_config_counts() {
        let config = Config {
            stars: 5,
            particles: 4,
            constellation_points: 3,
            dust: 2,
            ..Config::default()
        };
        let field = Starfield::new(&config, &mut StdRng::seed_from_u64(3));
        assert_eq!(field.len(), 14);
    }

    #[test]
    fn test_render_stays_inside_area() {
        let field = Starfield::new(&Config::default(), &mut StdRng::seed_from_u64(9));
        let area = layout::Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        let palette = ThemePreference::Dark.palette();
        field.render(&mut buf, area, 1234.0, &palette);
        assert!(buf.content().iter().any(|cell| cell.symbol() != " "));

        let mut layer = ShootingStarLayer::new(Size::new(160.0, 96.0), StdRng::seed_from_u64(1));
        layer.spawn(0, 0.0);
        layer.advance(0, 700.0);
        render_shooting_stars(&layer, &mut buf, area, &palette);
    }
}
