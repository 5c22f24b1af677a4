//! The terminal side of the theme toggle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glimmer_config::{ACKNOWLEDGE_MS, ThemeView};
use glimmer_core::ThemePreference;
use glimmer_effects::EventLoop;
use glimmer_effects::layers::sparkle::SparkleLayer;
use rand::Rng;

/// Applies a theme to the running scene and pulses the toggle control.
#[derive(Debug)]
pub struct TerminalTheme<R> {
    theme: ThemePreference,
    event_loop: EventLoop,
    sparkles: Rc<RefCell<SparkleLayer<R>>>,
    /// Bumped on every pulse so only the latest one ends it.
    pulse: Rc<Cell<u64>>,
    pulsing: Rc<Cell<bool>>,
}

impl<R: Rng> TerminalTheme<R> {
    pub fn new(event_loop: &EventLoop, sparkles: Rc<RefCell<SparkleLayer<R>>>) -> Self {
        Self {
            theme: ThemePreference::default(),
            event_loop: event_loop.clone(),
            sparkles,
            pulse: Rc::new(Cell::new(0)),
            pulsing: Rc::new(Cell::new(false)),
        }
    }

    /// Theme last applied.
    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulsing.get()
    }
}

impl<R: Rng> ThemeView for TerminalTheme<R> {
    fn apply(&mut self, theme: ThemePreference) {
        self.theme = theme;
        self.sparkles.borrow_mut().set_color(theme.palette().sparkle);
    }

    fn acknowledge(&mut self) {
        let generation = self.pulse.get() + 1;
        self.pulse.set(generation);
        self.pulsing.set(true);
        let (pulse, pulsing) = (self.pulse.clone(), self.pulsing.clone());
        self.event_loop
            .set_timeout(ACKNOWLEDGE_MS as f64, move |_now| {
                if pulse.get() == generation {
                    pulsing.set(false);
                }
            });
    }
}
