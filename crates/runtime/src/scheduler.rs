use foundation::time::Time;

use crate::frame::Frame;

/// Host frame scheduling, modelled on `requestAnimationFrame`.
///
/// Work asks for a frame with [`FrameScheduler::request_frame`]; the host calls
/// [`FrameScheduler::on_host_frame`] at every display refresh and only gets a
/// [`Frame`] back when one was requested. Requests do not accumulate: asking
/// twice before the host fires still yields a single frame.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
    last: Option<Frame>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_frame(&mut self) {
        self.pending = true;
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last
    }

    /// Index of the most recent frame, or 0 before the first one.
    pub fn frame_index(&self) -> u64 {
        self.last.map_or(0, |f| f.index)
    }

    /// Called by the host once per display refresh.
    pub fn on_host_frame(&mut self, now: Time) -> Option<Frame> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        let frame = match self.last {
            Some(prev) => prev.next(now),
            None => Frame::first(now),
        };
        self.last = Some(frame);
        Some(frame)
    }
}
