//! Cancellation handles for self-scheduling animation loops.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::event_loop::{CallbackId, EventLoop};

#[derive(Debug)]
struct HandleState {
    event_loop: EventLoop,
    stopped: Cell<bool>,
    /// Callbacks this loop has queued; some may already have run.
    scheduled: RefCell<Vec<CallbackId>>,
}

/// Owner-side handle of a running animation loop.
///
/// Loops check [`AnimationHandle::is_stopped`] at every re-schedule point and
/// [`AnimationHandle::stop`] cancels whatever they have queued. Dropping the
/// handle does not stop the loop.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    state: Rc<HandleState>,
}

impl AnimationHandle {
    pub fn new(event_loop: &EventLoop) -> Self {
        Self {
            state: Rc::new(HandleState {
                event_loop: event_loop.clone(),
                stopped: Cell::new(false),
                scheduled: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn stop(&self) {
        if self.state.stopped.replace(true) {
            return;
        }
        for id in self.state.scheduled.borrow_mut().drain(..) {
            self.state.event_loop.cancel(id);
        }
        tracing::debug!("animation loop stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.get()
    }

    /// Number of callbacks this loop still has queued.
    pub fn pending(&self) -> usize {
        let event_loop = &self.state.event_loop;
        self.state
            .scheduled
            .borrow()
            .iter()
            .filter(|id| event_loop.is_pending(**id))
            .count()
    }

    /// Queue a frame callback on behalf of the loop. No-op once stopped.
    pub fn request_frame(&self, callback: impl FnOnce(f64) + 'static) -> Option<CallbackId> {
        if self.is_stopped() {
            return None;
        }
        let id = self.state.event_loop.request_animation_frame(callback);
        self.track(id);
        Some(id)
    }

    /// Queue a timer on behalf of the loop. No-op once stopped.
    pub fn set_timeout(
        &self,
        delay_ms: f64,
        callback: impl FnOnce(f64) + 'static,
    ) -> Option<CallbackId> {
        if self.is_stopped() {
            return None;
        }
        let id = self.state.event_loop.set_timeout(delay_ms, callback);
        self.track(id);
        Some(id)
    }

    fn track(&self, id: CallbackId) {
        let event_loop = &self.state.event_loop;
        let mut scheduled = self.state.scheduled.borrow_mut();
        scheduled.retain(|old| event_loop.is_pending(*old));
        scheduled.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(handle: AnimationHandle, count: Rc<Cell<u32>>) {
        count.set(count.get() + 1);
        let next = handle.clone();
        handle.request_frame(move |_| spin(next, count));
    }

    #[test]
    fn test_stop_cancels_queued_callbacks() {
        let event_loop = EventLoop::new();
        let handle = AnimationHandle::new(&event_loop);
        let count = Rc::new(Cell::new(0));
        spin(handle.clone(), count.clone());
        handle.set_timeout(500.0, |_| panic!("cancelled timer ran"));

        event_loop.tick(16.0);
        event_loop.tick(32.0);
        assert_eq!(count.get(), 3);
        assert_eq!(handle.pending(), 2);

        handle.stop();
        assert_eq!(handle.pending(), 0);
        assert_eq!(event_loop.pending_frames(), 0);
        assert_eq!(event_loop.pending_timers(), 0);

        event_loop.tick(1000.0);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_stopped_handle_refuses_new_work() {
        let event_loop = EventLoop::new();
        let handle = AnimationHandle::new(&event_loop);
        handle.stop();
        assert!(handle.is_stopped());
        assert!(handle.request_frame(|_| {}).is_none());
        assert!(handle.set_timeout(0.0, |_| {}).is_none());
        assert_eq!(event_loop.pending_frames(), 0);
    }

    #[test]
    fn test_drop_does_not_stop() {
        let event_loop = EventLoop::new();
        let count = Rc::new(Cell::new(0));
        spin(AnimationHandle::new(&event_loop), count.clone());
        event_loop.tick(16.0);
        event_loop.tick(32.0);
        assert_eq!(count.get(), 3);
    }
}
