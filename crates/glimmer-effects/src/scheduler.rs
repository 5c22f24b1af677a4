//! Coalescing frame scheduler.
//!
//! Any number of [`FrameScheduler::request_update`] calls between two frames
//! produce exactly one run of the update callback on the next frame.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event_loop::{CallbackId, EventLoop};

struct SchedulerInner {
    event_loop: EventLoop,
    /// The queued frame callback, if an update is pending.
    pending: Cell<Option<CallbackId>>,
    update: RefCell<Box<dyn FnMut()>>,
    runs: Cell<u64>,
}

/// Debounces update requests to the next frame.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<SchedulerInner>,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.is_pending())
            .field("runs", &self.runs())
            .finish()
    }
}

impl FrameScheduler {
    pub fn new(event_loop: &EventLoop, update: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                event_loop: event_loop.clone(),
                pending: Cell::new(None),
                update: RefCell::new(Box::new(update)),
                runs: Cell::new(0),
            }),
        }
    }

    /// Ask for the update callback to run on the next frame.
    pub fn request_update(&self) {
        if self.inner.pending.get().is_some() {
            return;
        }
        let weak: Weak<SchedulerInner> = Rc::downgrade(&self.inner);
        let id = self.inner.event_loop.request_animation_frame(move |_now| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Cleared first so the update may request another frame.
            inner.pending.set(None);
            inner.runs.set(inner.runs.get() + 1);
            (inner.update.borrow_mut())();
        });
        self.inner.pending.set(Some(id));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Number of times the update callback has run.
    pub fn runs(&self) -> u64 {
        self.inner.runs.get()
    }

    /// Drop a queued update, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.inner.pending.take() {
            self.inner.event_loop.cancel(id);
        }
    }
}
