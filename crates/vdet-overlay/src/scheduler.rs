//! Scheduled redraw callbacks.
//!
//! Hosts schedule deferred redraws through a [`FrameScheduler`] (an
//! animation-frame queue in a browser). Views keep the handles they are
//! given in a [`CallbackRegistry`] so teardown can cancel everything still
//! in flight.

use std::collections::BTreeSet;

/// Handle for one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(pub u64);

/// Host-side animation-frame queue.
pub trait FrameScheduler {
    /// Schedule a callback for the next frame.
    fn request_frame(&mut self) -> CallbackHandle;

    /// Cancel a callback that has not fired yet.
    fn cancel_frame(&mut self, handle: CallbackHandle);
}

/// Outstanding callbacks owned by a view.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    pending: BTreeSet<CallbackHandle>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a callback and remember its handle.
    pub fn request(&mut self, scheduler: &mut dyn FrameScheduler) -> CallbackHandle {
        let handle = scheduler.request_frame();
        self.pending.insert(handle);
        handle
    }

    /// Mark a callback as fired. Returns false if it was unknown or cancelled.
    pub fn complete(&mut self, handle: CallbackHandle) -> bool {
        self.pending.remove(&handle)
    }

    pub fn is_pending(&self, handle: CallbackHandle) -> bool {
        self.pending.contains(&handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every outstanding callback; returns how many were cancelled.
    pub fn cancel_all(&mut self, scheduler: &mut dyn FrameScheduler) -> usize {
        let count = self.pending.len();
        for handle in std::mem::take(&mut self.pending) {
            scheduler.cancel_frame(handle);
        }
        count
    }
}

/// A scheduler whose callbacks fire only when the caller says so.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    queued: BTreeSet<CallbackHandle>,
    cancelled: Vec<CallbackHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop every queued handle, oldest first.
    pub fn drain(&mut self) -> Vec<CallbackHandle> {
        std::mem::take(&mut self.queued).into_iter().collect()
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    /// Handles cancelled so far, in cancellation order.
    pub fn cancelled(&self) -> &[CallbackHandle] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> CallbackHandle {
        self.next += 1;
        let handle = CallbackHandle(self.next);
        self.queued.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: CallbackHandle) {
        if self.queued.remove(&handle) {
            self.cancelled.push(handle);
        }
    }
}
