//! Rate limiting for scroll handling: one gate that coalesces bursts into a
//! single update per rendered frame, and one timer that fires after input has
//! gone quiet. Time is passed in by the caller.

use std::time::{Duration, Instant};

/// Coalesces any number of requests between two frames into one.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an update as wanted. Returns `true` only for the first request
    /// since the last frame, i.e. when the caller must schedule a frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Called from the frame callback. Returns whether an update was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Fires once `quiet` has elapsed since the most recent `reset`.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Pushes the deadline to `now + quiet`, superseding any pending one.
    pub fn reset(&mut self, now: Instant) -> Instant {
        let deadline = now + self.quiet;
        self.deadline = Some(deadline);
        deadline
    }

    /// Consumes the deadline if it has passed. Stale wakeups scheduled for
    /// an earlier, superseded deadline return `false`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
