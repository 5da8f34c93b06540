//! Host frame-callback boundary.

/// Handle for one outstanding frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Schedules the next presentation callback (a display-refresh tick, `requestAnimationFrame`,
/// a winit redraw).
///
/// The host answers a request by calling [`crate::PreviewPlayer::on_frame`] once. The player
/// keeps at most one request outstanding and cancels it on pause and teardown.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequestId;

    /// Cancel a request that has not fired yet. Unknown or already fired ids are ignored.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

impl<F: FrameScheduler + ?Sized> FrameScheduler for &mut F {
    fn request_frame(&mut self) -> FrameRequestId {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        (**self).cancel_frame(id)
    }
}

/// Scheduler driven by hand: the caller decides when a pending request fires.
///
/// Used by tests and the CLI preview simulation.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    next_id: u64,
    pending: Vec<FrameRequestId>,
    requested: u64,
    cancelled: u64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that are neither fired nor cancelled.
    pub fn pending(&self) -> &[FrameRequestId] {
        &self.pending
    }

    pub fn requested_count(&self) -> u64 {
        self.requested
    }

    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }

    /// Fire the oldest pending request. Returns `false` when nothing was pending, in which case
    /// the host must not call `on_frame`.
    pub fn fire(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        self.pending.remove(0);
        true
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        self.requested += 1;
        let id = FrameRequestId(self.next_id);
        self.pending.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        let before = self.pending.len();
        self.pending.retain(|p| *p != id);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
