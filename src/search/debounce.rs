//! Latest-only delayed execution.
//!
//! The debouncer never runs anything itself: the owner asks for the pending
//! deadline, sleeps until then, and calls `fire_due`. Scheduling again before
//! the deadline replaces the pending payload and restarts the quiet period.

use std::time::{Duration, Instant};

/// Quiet period between the last keystroke and the search request.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Pending<T> {
    due: Instant,
    payload: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    pending: Option<Pending<T>>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Replace any pending payload with `payload`, due `SEARCH_DEBOUNCE`
    /// after `now`. Returns the new deadline.
    pub fn schedule(&mut self, payload: T, now: Instant) -> Instant {
        let due = now + SEARCH_DEBOUNCE;
        self.pending = Some(Pending { due, payload });
        due
    }

    /// Drop the pending payload, if any. Returns whether one was dropped.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Take the pending payload if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }
}
