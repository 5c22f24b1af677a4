//! Pointer-tracked effects: registry, shared pointer state and tracker.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use glimmer_core::{Point, Size};

use crate::event_loop::EventLoop;
use crate::scheduler::FrameScheduler;
use crate::surface::ElementSurface;
use crate::transform::{
    Shift, TiltConfig, Transform, parallax_shift, parse_depth, planet_depth, tilt,
};

/// Elements carrying a parallax depth.
pub const DEPTH_SELECTOR: &str = "[data-depth]";
pub const DEPTH_ATTRIBUTE: &str = "data-depth";
/// Elements that tilt around their own centre.
pub const INTERACTIVE_SELECTOR: &str = ".cursor-interactive";
/// Cards that tilt with the viewport offset.
pub const CARD_SELECTOR: &str = ".card-parallax";
/// Planets whose depth comes from their position in the system.
pub const PLANET_SELECTOR: &str = ".planet";
/// The custom cursor element.
pub const CURSOR_SELECTOR: &str = ".custom-cursor";
/// Elements that put the custom cursor in its hover state.
pub const HOVER_SELECTOR: &str = "a, button, input";
pub const HOVER_FLAG: &str = "cursor-hover";

/// Last known pointer position, shared between the writer and the effects.
#[derive(Debug, Clone, Default)]
pub struct PointerState(Rc<Cell<Point>>);

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Point {
        self.0.get()
    }

    pub fn set(&self, point: Point) {
        self.0.set(point);
    }
}

/// An element and the coefficient it reacts to the pointer with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisteredElement<Id> {
    pub id: Id,
    pub depth: f64,
}

/// Every pointer-reactive element on a surface.
#[derive(Debug, Clone)]
pub struct PointerEffects<Id> {
    parallax: Vec<RegisteredElement<Id>>,
    planets: Vec<RegisteredElement<Id>>,
    tilts: Vec<(Id, TiltConfig)>,
    cursors: Vec<Id>,
    hover_targets: Vec<Id>,
}

impl<Id> Default for PointerEffects<Id> {
    fn default() -> Self {
        Self {
            parallax: Vec::new(),
            planets: Vec::new(),
            tilts: Vec::new(),
            cursors: Vec::new(),
            hover_targets: Vec::new(),
        }
    }
}

impl<Id: Copy + fmt::Debug> PointerEffects<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every marked element on `surface` with the preset tilts.
    pub fn register<S: ElementSurface<Id = Id>>(surface: &S) -> Self {
        Self::register_with(surface, TiltConfig::INTERACTIVE, TiltConfig::CARD)
    }

    /// Collect every marked element on `surface`, tilting interactive
    /// elements with `interactive` and cards with `card`.
    pub fn register_with<S: ElementSurface<Id = Id>>(
        surface: &S,
        interactive: TiltConfig,
        card: TiltConfig,
    ) -> Self {
        let mut effects = Self::new();
        for id in surface.query(DEPTH_SELECTOR) {
            let depth = parse_depth(surface.attribute(id, DEPTH_ATTRIBUTE).as_deref());
            effects.parallax.push(RegisteredElement { id, depth });
        }
        for (index, id) in surface.query(PLANET_SELECTOR).into_iter().enumerate() {
            effects.planets.push(RegisteredElement {
                id,
                depth: planet_depth(index),
            });
        }
        for id in surface.query(INTERACTIVE_SELECTOR) {
            effects.tilts.push((id, interactive));
        }
        for id in surface.query(CARD_SELECTOR) {
            effects.tilts.push((id, card));
        }
        effects.cursors = surface.query(CURSOR_SELECTOR);
        effects.hover_targets = surface.query(HOVER_SELECTOR);
        tracing::info!(
            parallax = effects.parallax.len(),
            planets = effects.planets.len(),
            tilts = effects.tilts.len(),
            cursors = effects.cursors.len(),
            "registered pointer effects"
        );
        effects
    }

    pub fn parallax_elements(&self) -> &[RegisteredElement<Id>] {
        &self.parallax
    }

    pub fn planets(&self) -> &[RegisteredElement<Id>] {
        &self.planets
    }

    pub fn len(&self) -> usize {
        self.parallax.len() + self.planets.len() + self.tilts.len() + self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute and apply every transform for `pointer`.
    ///
    /// An element that cannot be measured or written is skipped; the rest
    /// are still updated. Returns the number of transforms applied.
    pub fn update<S: ElementSurface<Id = Id>>(&self, surface: &mut S, pointer: Point) -> usize {
        let viewport: Size = surface.viewport();
        let mut applied = 0;

        for element in &self.parallax {
            let shift = parallax_shift(pointer, viewport, element.depth);
            applied += apply(surface, element.id, &Transform::parallax(shift));
        }

        for planet in &self.planets {
            let shift = parallax_shift(pointer, viewport, planet.depth);
            applied += apply(surface, planet.id, &Transform::translate(shift));
        }

        for (id, config) in &self.tilts {
            let Some(rect) = surface.bounding_box(*id) else {
                tracing::debug!(id = ?id, "tilt target not measurable, skipping");
                continue;
            };
            let angles = tilt(pointer, rect, viewport, config);
            applied += apply(surface, *id, &Transform::tilt(angles, config));
        }

        if !self.cursors.is_empty() {
            let hovering = self.hover_targets.iter().any(|id| {
                surface
                    .bounding_box(*id)
                    .is_some_and(|rect| rect.contains(pointer))
            });
            let follow = Transform::translate(if pointer.is_finite() {
                Shift {
                    x: pointer.x,
                    y: pointer.y,
                }
            } else {
                Shift::ZERO
            });
            for id in &self.cursors {
                applied += apply(surface, *id, &follow);
                if let Err(err) = surface.set_flag(*id, HOVER_FLAG, hovering) {
                    tracing::debug!(id = ?id, %err, "cursor hover flag not applied");
                }
            }
        }

        applied
    }
}

fn apply<S: ElementSurface>(surface: &mut S, id: S::Id, transform: &Transform) -> usize {
    match surface.set_transform(id, transform) {
        Ok(()) => 1,
        Err(err) => {
            tracing::debug!(id = ?id, %err, "transform not applied");
            0
        }
    }
}

/// Feeds pointer moves through a [`FrameScheduler`] into [`PointerEffects`].
#[derive(Debug, Clone)]
pub struct PointerTracker {
    pointer: PointerState,
    scheduler: FrameScheduler,
}

impl PointerTracker {
    pub fn new<S>(
        event_loop: &EventLoop,
        effects: PointerEffects<S::Id>,
        surface: Rc<RefCell<S>>,
    ) -> Self
    where
        S: ElementSurface + 'static,
        S::Id: 'static,
    {
        let pointer = PointerState::new();
        let reader = pointer.clone();
        let scheduler = FrameScheduler::new(event_loop, move || {
            effects.update(&mut *surface.borrow_mut(), reader.get());
        });
        Self { pointer, scheduler }
    }

    /// Record a pointer move and schedule one update for this frame.
    pub fn on_pointer_move(&self, point: Point) {
        self.pointer.set(point);
        self.scheduler.request_update();
    }

    /// Schedule an update without moving the pointer, e.g. after a resize.
    pub fn refresh(&self) {
        self.scheduler.request_update();
    }

    pub fn pointer(&self) -> Point {
        self.pointer.get()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }
}
