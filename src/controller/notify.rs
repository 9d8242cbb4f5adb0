use thiserror::Error;

use crate::search::SearchError;

use super::state::ControllerState;

/// Errors surfaced to the observer. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Search(#[from] SearchError),
    /// The selected track's preview URL could not be used.
    #[error("invalid media URL {url:?}: {reason}")]
    PlaybackResource { url: String, reason: String },
    /// The engine could not fetch or decode the selected track.
    #[error("playback failed: {0}")]
    Playback(String),
}

/// State changes pushed to the presentation layer, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    SongsUpdated,
    PlayingStateUpdated,
    LoadingStateUpdated,
    ErrorEncountered(ControllerError),
    PlaybackStarted,
    CurrentSongUpdated,
    ProgressUpdated {
        current_time: f64,
        duration: Option<f64>,
    },
}

/// Receives controller notifications.
///
/// `state` already reflects the change being reported. The controller only
/// holds a weak reference, so the observer's owner decides its lifetime.
pub trait ControllerObserver {
    fn notify(&self, state: &ControllerState, notification: &Notification);
}
