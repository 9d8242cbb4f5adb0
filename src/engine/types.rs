//! Engine-facing types: the capability trait, its events and the commands
//! understood by the audio thread.

use std::time::Duration;

use reqwest::Url;

/// Identifies one registered observer so it can be removed later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Periodic position report for the loaded item, in seconds.
    /// `duration` is `None` while the total length is unknown.
    Progress {
        current_time: f64,
        duration: Option<f64>,
    },
    /// The loaded item played to its end.
    ReachedEnd,
    /// The loaded item could not be fetched or decoded.
    Failed(String),
}

/// Invoked on the engine's own thread; implementations must only forward.
pub type EventCallback = Box<dyn Fn(EngineEvent) + Send + 'static>;

/// What the controller needs from a media player.
///
/// All calls are fire-and-forget. Calls that need a loaded item (`play`,
/// `pause`, `seek`) are ignored when nothing is loaded.
pub trait PlaybackEngine {
    /// Replace the current item with the media at `url`.
    fn load(&mut self, url: &Url);
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump to `fraction` (0.0..=1.0) of the item's duration. No-op while the
    /// duration is unknown.
    fn seek(&mut self, fraction: f64);
    /// Register `callback` for progress every `interval` plus end-of-media
    /// and failure events. Replaces any previous observer.
    fn observe(&mut self, interval: Duration, callback: EventCallback) -> ObserverToken;
    /// Stop delivering events to the observer registered under `token`.
    fn remove_observer(&mut self, token: ObserverToken);
}

pub(super) enum EngineCmd {
    Load(Url),
    Play,
    Pause,
    Seek(f64),
    Observe {
        token: ObserverToken,
        interval: Duration,
        callback: EventCallback,
    },
    RemoveObserver(ObserverToken),
    /// Posted by the fetch worker once the media bytes for `generation` arrive.
    Fetched {
        generation: u64,
        result: Result<Vec<u8>, String>,
    },
    Quit,
}
