//! Canvas-drawn sparkles rising from the bottom edge.

use std::cell::RefCell;
use std::rc::Rc;

use glimmer_core::{Point, Rect, Rgba, Size};
use rand::Rng;

use crate::animation::AnimationHandle;
use crate::canvas::Canvas2d;
use crate::event_loop::EventLoop;

/// Default number of sparkles.
pub const SPARKLE_COUNT: usize = 50;

/// Default fill, white at 80% opacity.
pub const SPARKLE_COLOR: Rgba = Rgba::rgba(255, 255, 255, 0.8);

/// A single sparkle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sparkle {
    pub x: f64,
    pub y: f64,
    /// Radius, in `[1, 3)`.
    pub size: f64,
    /// Upward movement per frame, in `[0.1, 0.6)`.
    pub velocity: f64,
}

impl Sparkle {
    fn random<R: Rng>(rng: &mut R, bounds: Size) -> Self {
        Self {
            x: rng.random::<f64>() * bounds.width,
            y: rng.random::<f64>() * bounds.height,
            size: rng.random::<f64>() * 2.0 + 1.0,
            velocity: rng.random::<f64>() * 0.5 + 0.1,
        }
    }
}

/// A fixed pool of sparkles over a canvas of a given size.
#[derive(Debug)]
pub struct SparkleLayer<R> {
    sparkles: Vec<Sparkle>,
    bounds: Size,
    color: Rgba,
    rng: R,
}

impl<R: Rng> SparkleLayer<R> {
    pub fn new(count: usize, bounds: Size, mut rng: R) -> Self {
        let sparkles = (0..count).map(|_| Sparkle::random(&mut rng, bounds)).collect();
        Self {
            sparkles,
            bounds,
            color: SPARKLE_COLOR,
            rng,
        }
    }

    pub fn sparkles(&self) -> &[Sparkle] {
        &self.sparkles
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Adopt a new surface size. Sparkles outside the new bounds are recycled
    /// on their way up like any other.
    /// Sparkles left outside the new bounds start over inside them.
    pub fn resize(&mut self, bounds: Size) {
        self.bounds = bounds;
        for sparkle in self.sparkles.iter_mut() {
            if sparkle.x >= bounds.width || sparkle.y > bounds.height {
                *sparkle = Sparkle::random(&mut self.rng, bounds);
            }
        }
    }

    /// Draw one frame and advance every sparkle.
    pub fn step<C: Canvas2d + ?Sized>(&mut self, canvas: &mut C) {
        canvas.clear(Rect::from_size(canvas.size()));
        for i in 0..self.sparkles.len() {
            let sparkle = self.sparkles[i];
            canvas.fill_circle(Point::new(sparkle.x, sparkle.y), sparkle.size, self.color);

            let sparkle = &mut self.sparkles[i];
            sparkle.y -= sparkle.velocity;
            if sparkle.y < 0.0 {
                let fresh = Sparkle::random(&mut self.rng, self.bounds);
                *sparkle = Sparkle {
                    y: self.bounds.height,
                    ..fresh
                };
            }
        }
    }
}

/// Run `layer` on every frame until the returned handle is stopped.
pub fn start<R, C>(
    event_loop: &EventLoop,
    layer: Rc<RefCell<SparkleLayer<R>>>,
    canvas: Rc<RefCell<C>>,
) -> AnimationHandle
where
    R: Rng + 'static,
    C: Canvas2d + 'static,
{
    let handle = AnimationHandle::new(event_loop);
    tracing::info!(count = layer.borrow().sparkles().len(), "sparkle loop started");
    frame(handle.clone(), layer, canvas);
    handle
}

fn frame<R, C>(handle: AnimationHandle, layer: Rc<RefCell<SparkleLayer<R>>>, canvas: Rc<RefCell<C>>)
where
    R: Rng + 'static,
    C: Canvas2d + 'static,
{
    if handle.is_stopped() {
        return;
    }
    layer.borrow_mut().step(&mut *canvas.borrow_mut());
    let next = handle.clone();
    handle.request_frame(move |_now| frame(next, layer, canvas));
}
