//! Bookkeeping for the audio thread that does not touch the output device.

use std::time::{Duration, Instant};

use super::types::EngineEvent;

/// Load generations, the requested play state and failures nobody has
/// observed yet.
#[derive(Debug, Default)]
pub(super) struct LoadState {
    generation: u64,
    want_playing: bool,
    pending_failure: Option<String>,
}

impl LoadState {
    /// Start a new load and return its generation. Play state and any
    /// unreported failure belong to the previous item and are reset.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.want_playing = false;
        self.pending_failure = None;
        self.generation
    }

    /// Whether fetched media for `generation` is still wanted.
    pub fn accepts(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.want_playing = playing;
    }

    /// Play requested before (or after) the media arrived.
    pub fn want_playing(&self) -> bool {
        self.want_playing
    }

    /// Keep a failure until an observer registers.
    pub fn defer_failure(&mut self, reason: String) {
        self.pending_failure = Some(reason);
    }

    pub fn take_failure(&mut self) -> Option<String> {
        self.pending_failure.take()
    }
}

/// Per-item state behind progress and end-of-media reporting.
#[derive(Debug, Default)]
pub(super) struct TickState {
    ended: bool,
    last_emit: Option<Instant>,
}

impl TickState {
    /// Report progress on the next tick regardless of the interval.
    pub fn reset_interval(&mut self) {
        self.last_emit = None;
    }

    /// Decide what one tick reports.
    ///
    /// Nothing while paused or after the end was reported. `drained` (the
    /// sink ran out) yields `ReachedEnd` exactly once; otherwise progress is
    /// reported at most once per `interval`.
    pub fn advance(
        &mut self,
        playing: bool,
        drained: bool,
        now: Instant,
        interval: Duration,
        position: Duration,
        duration: Option<Duration>,
    ) -> Option<EngineEvent> {
        if !playing || self.ended {
            return None;
        }

        if drained {
            self.ended = true;
            return Some(EngineEvent::ReachedEnd);
        }

        if self
            .last_emit
            .is_some_and(|last| now.duration_since(last) < interval)
        {
            return None;
        }
        self.last_emit = Some(now);
        Some(EngineEvent::Progress {
            current_time: position.as_secs_f64(),
            duration: duration.map(|d| d.as_secs_f64()),
        })
    }
}
