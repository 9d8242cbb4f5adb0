use reqwest::Url;

use crate::engine::ObserverToken;
use crate::search::Track;

/// Observable controller state. Only the controller mutates it.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub(super) songs: Vec<Track>,
    pub(super) is_loading: bool,
    pub(super) is_playing: bool,
    pub(super) current_index: Option<usize>,
}

impl ControllerState {
    pub fn songs(&self) -> &[Track] {
        &self.songs
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_song(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.songs.get(i))
    }

    /// True iff `index` is the selected track and it is playing.
    pub fn is_currently_playing(&self, index: usize) -> bool {
        self.current_index == Some(index) && self.is_playing
    }
}

/// The engine subscription belonging to the selected track.
#[derive(Debug)]
pub(super) struct PlaybackSession {
    pub id: u64,
    pub token: ObserverToken,
    pub url: Url,
}
