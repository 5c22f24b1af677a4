//! Single-threaded cooperative event loop with a virtual millisecond clock.
//!
//! This is the host's frame-timing and timer primitive. Hosts advance it by
//! calling [`EventLoop::tick`] with the current time; tests advance it with
//! synthetic timestamps. Callbacks always run with no internal borrow held,
//! so they are free to schedule or cancel other callbacks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifies a scheduled frame callback or timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

type Callback = Box<dyn FnOnce(f64)>;

struct Timer {
    id: CallbackId,
    due_ms: f64,
    callback: Callback,
}

#[derive(Default)]
struct LoopState {
    now_ms: f64,
    next_id: u64,
    frames: Vec<(CallbackId, Callback)>,
    timers: Vec<Timer>,
}

impl LoopState {
    fn allocate(&mut self) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Cheaply clonable handle to a shared event loop.
#[derive(Clone, Default)]
pub struct EventLoop {
    state: Rc<RefCell<LoopState>>,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventLoop")
            .field("now_ms", &state.now_ms)
            .field("frames", &state.frames.len())
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> f64 {
        self.state.borrow().now_ms
    }

    /// Run `callback` on the next frame, before the next repaint.
    ///
    /// Callbacks requested while a frame is running are deferred to the
    /// following frame.
    pub fn request_animation_frame(&self, callback: impl FnOnce(f64) + 'static) -> CallbackId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.frames.push((id, Box::new(callback)));
        id
    }

    /// Run `callback` once the clock has advanced by at least `delay_ms`.
    pub fn set_timeout(&self, delay_ms: f64, callback: impl FnOnce(f64) + 'static) -> CallbackId {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        let due_ms = state.now_ms + delay_ms;
        state.timers.push(Timer {
            id,
            due_ms,
            callback: Box::new(callback),
        });
        id
    }

    /// Drop a pending callback. Returns false if it already ran or was
    /// cancelled before.
    pub fn cancel(&self, id: CallbackId) -> bool {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.frames.iter().position(|(fid, _)| *fid == id) {
            drop(state.frames.remove(pos));
            return true;
        }
        if let Some(pos) = state.timers.iter().position(|t| t.id == id) {
            drop(state.timers.remove(pos));
            return true;
        }
        false
    }

    /// Whether `id` is still waiting to run.
    pub fn is_pending(&self, id: CallbackId) -> bool {
        let state = self.state.borrow();
        state.frames.iter().any(|(fid, _)| *fid == id) || state.timers.iter().any(|t| t.id == id)
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Due time of the earliest timer, if any.
    pub fn next_timer_due(&self) -> Option<f64> {
        self.state
            .borrow()
            .timers
            .iter()
            .map(|t| t.due_ms)
            .min_by(f64::total_cmp)
    }

    /// Advance the clock to `now_ms`, run due timers, then run one frame.
    ///
    /// The clock never moves backwards. Only callbacks scheduled before this
    /// call are eligible, so a callback that reschedules itself runs once
    /// per tick.
    pub fn tick(&self, now_ms: f64) {
        let horizon = {
            let mut state = self.state.borrow_mut();
            if now_ms.is_finite() && now_ms > state.now_ms {
                state.now_ms = now_ms;
            }
            CallbackId(state.next_id)
        };

        while let Some((callback, now)) = self.take_due_timer(horizon) {
            callback(now);
        }
        while let Some((callback, now)) = self.take_frame(horizon) {
            callback(now);
        }
    }

    fn take_due_timer(&self, horizon: CallbackId) -> Option<(Callback, f64)> {
        let mut state = self.state.borrow_mut();
        let now = state.now_ms;
        let pos = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id < horizon && t.due_ms <= now)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(pos, _)| pos)?;
        Some((state.timers.remove(pos).callback, now))
    }

    fn take_frame(&self, horizon: CallbackId) -> Option<(Callback, f64)> {
        let mut state = self.state.borrow_mut();
        let now = state.now_ms;
        // Frames are stored in request order, so the first eligible one is the oldest.
        let pos = state.frames.iter().position(|(id, _)| *id < horizon)?;
        Some((state.frames.remove(pos).1, now))
    }
}
