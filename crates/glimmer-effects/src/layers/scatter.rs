//! Scatter layers: particles, constellation points, twinkling stars and dust.
//!
//! Entities are sampled once at init and never move in code; hosts animate
//! them from the sampled delay (twinkle phase) and size.

use std::f64::consts::TAU;

use rand::Rng;

use crate::error::EffectError;

/// Parameters of a scatter layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterSpec {
    pub class: &'static str,
    pub count: usize,
    /// Delays are sampled from `[0, max_delay_secs)`.
    pub max_delay_secs: f64,
    /// Sizes are sampled from `[min, max)`; equal bounds mean a fixed size.
    pub size_px: (f64, f64),
}

impl ScatterSpec {
    pub const PARTICLES: ScatterSpec = ScatterSpec {
        class: "particle",
        count: 50,
        max_delay_secs: 0.0,
        size_px: (1.0, 1.0),
    };

    pub const CONSTELLATION: ScatterSpec = ScatterSpec {
        class: "constellation-point",
        count: 20,
        max_delay_secs: 0.0,
        size_px: (1.0, 1.0),
    };

    pub const STARS: ScatterSpec = ScatterSpec {
        class: "star",
        count: 50,
        max_delay_secs: 3.0,
        size_px: (1.0, 1.0),
    };

    pub const DUST: ScatterSpec = ScatterSpec {
        class: "particle",
        count: 100,
        max_delay_secs: 5.0,
        size_px: (1.0, 4.0),
    };

    pub fn with_count(self, count: usize) -> Self {
        Self { count, ..self }
    }
}

/// One scattered entity. Positions are fractions of the container in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub delay_secs: f64,
    pub size_px: f64,
}

impl ScatterPoint {
    fn sample<R: Rng>(spec: &ScatterSpec, rng: &mut R) -> Self {
        let x = rng.random::<f64>();
        let y = rng.random::<f64>();
        let delay_secs = rng.random::<f64>() * spec.max_delay_secs;
        let (min, max) = spec.size_px;
        let size_px = min + rng.random::<f64>() * (max - min);
        Self {
            x,
            y,
            delay_secs,
            size_px,
        }
    }

    /// Twinkle brightness in `[0, 1]` at `elapsed_ms` for a cycle of `period_ms`.
    pub fn brightness(&self, elapsed_ms: f64, period_ms: f64) -> f64 {
        if period_ms <= 0.0 || !elapsed_ms.is_finite() {
            return 1.0;
        }
        let phase = (elapsed_ms / period_ms - self.delay_secs * 1000.0 / period_ms) * TAU;
        (phase.sin() + 1.0) / 2.0
    }
}

/// Something scatter entities can be attached to.
pub trait LayerContainer {
    fn attach(&mut self, point: ScatterPoint);
}

/// A container that keeps what was attached to it.
#[derive(Debug, Clone, Default)]
pub struct ScatterLayer {
    points: Vec<ScatterPoint>,
}

impl ScatterLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ScatterPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl LayerContainer for ScatterLayer {
    fn attach(&mut self, point: ScatterPoint) {
        self.points.push(point);
    }
}

/// Create `spec.count` entities and attach them to `container`.
///
/// A missing container attaches nothing and reports the layer's class.
/// Calling it twice on the same container attaches a second set.
pub fn init_layer<C, R>(
    container: Option<&mut C>,
    spec: &ScatterSpec,
    rng: &mut R,
) -> Result<usize, EffectError>
where
    C: LayerContainer + ?Sized,
    R: Rng,
{
    let Some(container) = container else {
        return Err(EffectError::MissingContainer(spec.class.to_string()));
    };
    for _ in 0..spec.count {
        container.attach(ScatterPoint::sample(spec, rng));
    }
    Ok(spec.count)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_init_creates_exact_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for spec in [
            ScatterSpec::PARTICLES,
            ScatterSpec::CONSTELLATION,
            ScatterSpec::STARS,
            ScatterSpec::DUST,
        ] {
            let mut layer = ScatterLayer::new();
            assert_eq!(init_layer(Some(&mut layer), &spec, &mut rng), Ok(spec.count));
            assert_eq!(layer.len(), spec.count);
        }
    }

    #[test]
    fn test_sampled_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut layer = ScatterLayer::new();
        init_layer(Some(&mut layer), &ScatterSpec::DUST.with_count(500), &mut rng).unwrap();
        for p in layer.points() {
            assert!((0.0..1.0).contains(&p.x));
            assert!((0.0..1.0).contains(&p.y));
            assert!((0.0..5.0).contains(&p.delay_secs));
            assert!((1.0..4.0).contains(&p.size_px));
        }
    }

    #[test]
    fn test_double_init_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = ScatterLayer::new();
        init_layer(Some(&mut layer), &ScatterSpec::CONSTELLATION, &mut rng).unwrap();
        init_layer(Some(&mut layer), &ScatterSpec::CONSTELLATION, &mut rng).unwrap();
        assert_eq!(layer.len(), 40);
    }

    #[test]
    fn test_missing_container_attaches_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            init_layer::<ScatterLayer, _>(None, &ScatterSpec::STARS, &mut rng),
            Err(EffectError::MissingContainer("star".to_string()))
        );
    }

    #[test]
    fn test_brightness_bounds() {
        let point = ScatterPoint {
            x: 0.0,
            y: 0.0,
            delay_secs: 0.7,
            size_px: 1.0,
        };
        for t in [0.0, 100.0, 1234.5, 99_999.0] {
            let b = point.brightness(t, 3000.0);
            assert!((0.0..=1.0).contains(&b));
        }
        assert_eq!(point.brightness(10.0, 0.0), 1.0);
    }
}
