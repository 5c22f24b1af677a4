//! Shooting stars spawned on randomized, completion-chained timers.
//!
//! Each of the [`CHAINS`] slots runs an independent chain: spawn a star,
//! let it cross the sky, and once it has finished wait `random * 3000` ms
//! before spawning the next one in the same slot.

use std::cell::RefCell;
use std::rc::Rc;

use glimmer_core::{Point, Size};
use rand::Rng;

use crate::animation::AnimationHandle;
use crate::event_loop::EventLoop;

/// Number of concurrent chains, and so the pool size.
pub const CHAINS: usize = 3;

/// Offset between the initial spawns of each chain.
pub const INITIAL_STAGGER_MS: f64 = 2000.0;

/// Upper bound of the random gap between a star finishing and the next spawn.
pub const RESPAWN_MAX_MS: f64 = 3000.0;

/// Time a star takes to cross the surface.
pub const TRAVEL_MS: f64 = 1500.0;

/// Horizontal start offset, left of the visible area.
const START_X: f64 = -100.0;

/// Vertical drop over a full crossing, as a fraction of the distance travelled.
const DROP_RATIO: f64 = 0.3;

/// A star in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShootingStar {
    /// Starting height as a percentage of the surface, in `[0, 50)`.
    pub top_percent: f64,
    pub started_ms: f64,
    /// Completed fraction of the crossing, in `[0, 1]`.
    pub progress: f64,
}

impl ShootingStar {
    /// Current head position on a surface of `bounds`.
    pub fn position(&self, bounds: Size) -> Point {
        let distance = bounds.width - 2.0 * START_X;
        let x = START_X + self.progress * distance;
        let y = self.top_percent / 100.0 * bounds.height + self.progress * distance * DROP_RATIO;
        Point::new(x, y)
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Fixed pool of shooting-star slots.
#[derive(Debug)]
pub struct ShootingStarLayer<R> {
    slots: [Option<ShootingStar>; CHAINS],
    bounds: Size,
    travel_ms: f64,
    rng: R,
}

impl<R: Rng> ShootingStarLayer<R> {
    pub fn new(bounds: Size, rng: R) -> Self {
        Self {
            slots: [None; CHAINS],
            bounds,
            travel_ms: TRAVEL_MS,
            rng,
        }
    }

    pub fn with_travel_ms(mut self, travel_ms: f64) -> Self {
        if travel_ms.is_finite() && travel_ms > 0.0 {
            self.travel_ms = travel_ms;
        }
        self
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn resize(&mut self, bounds: Size) {
        self.bounds = bounds;
    }

    /// Stars currently in flight.
    pub fn stars(&self) -> impl Iterator<Item = &ShootingStar> {
        self.slots.iter().flatten()
    }

    /// Place a fresh star in `slot`, replacing whatever was there.
    pub fn spawn(&mut self, slot: usize, now_ms: f64) {
        let Some(entry) = self.slots.get_mut(slot) else {
            return;
        };
        *entry = Some(ShootingStar {
            top_percent: self.rng.random::<f64>() * 50.0,
            started_ms: now_ms,
            progress: 0.0,
        });
    }

    /// Advance the star in `slot` to `now_ms`, removing it once it has
    /// finished. Returns true when the slot is empty afterwards.
    pub fn advance(&mut self, slot: usize, now_ms: f64) -> bool {
        let travel_ms = self.travel_ms;
        let Some(Some(star)) = self.slots.get_mut(slot) else {
            return true;
        };
        star.progress = ((now_ms - star.started_ms) / travel_ms).clamp(0.0, 1.0);
        if star.is_finished() {
            self.slots[slot] = None;
            return true;
        }
        false
    }

    /// Delay before the next spawn in a chain.
    pub fn next_delay_ms(&mut self) -> f64 {
        self.rng.random::<f64>() * RESPAWN_MAX_MS
    }
}

/// Start every chain with the initial stagger. Stop with the returned handle.
pub fn start<R>(event_loop: &EventLoop, layer: Rc<RefCell<ShootingStarLayer<R>>>) -> AnimationHandle
where
    R: Rng + 'static,
{
    let handle = AnimationHandle::new(event_loop);
    for slot in 0..CHAINS {
        let (h, l) = (handle.clone(), layer.clone());
        handle.set_timeout(slot as f64 * INITIAL_STAGGER_MS, move |now| {
            spawn(h, l, slot, now)
        });
    }
    tracing::info!(chains = CHAINS, "shooting stars started");
    handle
}

fn spawn<R>(
    handle: AnimationHandle,
    layer: Rc<RefCell<ShootingStarLayer<R>>>,
    slot: usize,
    now: f64,
) where
    R: Rng + 'static,
{
    if handle.is_stopped() {
        return;
    }
    layer.borrow_mut().spawn(slot, now);
    fly(handle, layer, slot);
}

fn fly<R>(handle: AnimationHandle, layer: Rc<RefCell<ShootingStarLayer<R>>>, slot: usize)
where
    R: Rng + 'static,
{
    let next = handle.clone();
    handle.request_frame(move |now| {
        if next.is_stopped() {
            return;
        }
        let landed = layer.borrow_mut().advance(slot, now);
        if !landed {
            fly(next, layer, slot);
            return;
        }
        let delay = layer.borrow_mut().next_delay_ms();
        let h = next.clone();
        next.set_timeout(delay, move |now| spawn(h, layer, slot, now));
    });
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    const BOUNDS: Size = Size::new(800.0, 600.0);

    fn shared(seed: u64) -> Rc<RefCell<ShootingStarLayer<StdRng>>> {
        Rc::new(RefCell::new(ShootingStarLayer::new(
            BOUNDS,
            StdRng::seed_from_u64(seed),
        )))
    }

    #[test]
    fn test_spawn_and_finish() {
        let mut layer = ShootingStarLayer::new(BOUNDS, StdRng::seed_from_u64(1));
        layer.spawn(0, 100.0);
        let star = *layer.stars().next().unwrap();
        assert!((0.0..50.0).contains(&star.top_percent));
        assert_eq!(star.position(BOUNDS).x, -100.0);

        assert!(!layer.advance(0, 100.0 + TRAVEL_MS / 2.0));
        let mid = *layer.stars().next().unwrap();
        assert!((mid.progress - 0.5).abs() < 1e-12);
        assert!((mid.position(BOUNDS).x - 400.0).abs() < 1e-9);

        assert!(layer.advance(0, 100.0 + TRAVEL_MS));
        assert_eq!(layer.stars().count(), 0);
        assert!(layer.advance(0, 5000.0));
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let mut layer = ShootingStarLayer::new(BOUNDS, StdRng::seed_from_u64(1));
        layer.spawn(CHAINS, 0.0);
        assert_eq!(layer.stars().count(), 0);
        assert!(layer.advance(CHAINS + 4, 0.0));
    }

    #[test]
    fn test_next_delay_range() {
        let mut layer = ShootingStarLayer::new(BOUNDS, StdRng::seed_from_u64(9));
        for _ in 0..100 {
            assert!((0.0..RESPAWN_MAX_MS).contains(&layer.next_delay_ms()));
        }
    }

    #[test]
    fn test_initial_stagger() {
        let event_loop = EventLoop::new();
        let layer = shared(2);
        let _handle = start(&event_loop, layer.clone());

        event_loop.tick(0.0);
        assert_eq!(layer.borrow().stars().count(), 1);
        event_loop.tick(1000.0);
        assert_eq!(layer.borrow().stars().count(), 1);
        event_loop.tick(2000.0);
        assert_eq!(layer.borrow().stars().count(), 1, "first star finished");
        event_loop.tick(4000.0);
        assert!(layer.borrow().stars().count() >= 1);
    }

    #[test]
    fn test_chains_never_exceed_pool() {
        let event_loop = EventLoop::new();
        let layer = shared(3);
        let handle = start(&event_loop, layer.clone());

        let mut spawned_after_finish = false;
        let mut t = 0.0;
        while t < 30_000.0 {
            event_loop.tick(t);
            let live = layer.borrow().stars().count();
            assert!(live <= CHAINS);
            if t > 10_000.0 && live > 0 {
                spawned_after_finish = true;
            }
            t += 16.0;
        }
        assert!(spawned_after_finish);
        assert!(handle.pending() >= 1);
    }

    #[test]
    fn test_stop_ends_every_chain() {
        let event_loop = EventLoop::new();
        let layer = shared(4);
        let handle = start(&event_loop, layer.clone());
        event_loop.tick(0.0);
        event_loop.tick(16.0);
        handle.stop();
        assert_eq!(event_loop.pending_frames(), 0);
        assert_eq!(event_loop.pending_timers(), 0);

        let before: Vec<ShootingStar> = layer.borrow().stars().copied().collect();
        event_loop.tick(60_000.0);
        let after: Vec<ShootingStar> = layer.borrow().stars().copied().collect();
        assert_eq!(before, after);
    }
}
