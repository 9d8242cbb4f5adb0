//! Application model types: `App` and `Focus`.
//!
//! `App` is the terminal front-end's view of the controller. It keeps the
//! query being typed, the list cursor and a snapshot of everything the
//! controller reported, and it is the controller's observer.

use std::cell::RefCell;

use crate::controller::{ControllerObserver, ControllerState, Notification};
use crate::search::Track;

/// Which part of the screen receives keystrokes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    /// Typing edits the search query.
    #[default]
    Query,
    /// Keys navigate and control playback.
    Results,
}

/// Last reported position of the playing track, in seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Progress {
    pub current_time: f64,
    pub duration: Option<f64>,
}

impl Progress {
    /// Fraction of the track already played, when the duration is known.
    pub fn ratio(&self) -> Option<f64> {
        match self.duration {
            Some(d) if d > 0.0 => Some((self.current_time / d).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub query: String,
    pub focus: Focus,
    pub selected: usize,
    pub metadata_window: bool,

    pub songs: Vec<Track>,
    pub playing_index: Option<usize>,
    pub is_playing: bool,
    pub is_loading: bool,
    pub now_playing: Option<Track>,
    pub progress: Option<Progress>,
    pub last_error: Option<String>,
}

impl App {
    /// Create a new `App` with `query` already typed in.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn has_songs(&self) -> bool {
        !self.songs.is_empty()
    }

    pub fn focus_query(&mut self) {
        self.focus = Focus::Query;
        self.metadata_window = false;
    }

    pub fn focus_results(&mut self) {
        self.focus = Focus::Results;
    }

    /// Append a character to the query. Returns false for control characters.
    pub fn push_query_char(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        self.query.push(c);
        true
    }

    /// Remove the last character of the query. Returns false when it was empty.
    pub fn pop_query_char(&mut self) -> bool {
        self.query.pop().is_some()
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Move the cursor to the next song, wrapping around.
    pub fn next(&mut self) {
        if self.has_songs() {
            self.selected = (self.selected + 1) % self.songs.len();
        }
    }

    /// Move the cursor to the previous song, wrapping around.
    pub fn prev(&mut self) {
        if self.has_songs() {
            let n = self.songs.len();
            self.selected = (self.selected + n - 1) % n;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.songs.len().saturating_sub(1);
    }

    /// The song under the cursor.
    pub fn selected_song(&self) -> Option<&Track> {
        self.songs.get(self.selected)
    }

    /// True when row `index` is the playing track.
    pub fn is_row_playing(&self, index: usize) -> bool {
        self.is_playing && self.playing_index == Some(index)
    }

    /// Seek fraction for a jump of `delta_secs` from the current position.
    ///
    /// `None` until the engine has reported a usable duration.
    pub fn scrub_fraction(&self, delta_secs: f64) -> Option<f64> {
        let progress = self.progress?;
        let duration = progress.duration.filter(|d| *d > 0.0)?;
        let target = (progress.current_time + delta_secs).clamp(0.0, duration);
        Some(target / duration)
    }

    /// Fold a controller notification into the view state.
    pub fn apply(&mut self, state: &ControllerState, notification: &Notification) {
        match notification {
            Notification::SongsUpdated => {
                self.songs = state.songs().to_vec();
                self.playing_index = state.current_index();
                self.selected = 0;
                self.metadata_window = false;
            }
            Notification::PlayingStateUpdated => {
                self.is_playing = state.is_playing();
            }
            Notification::LoadingStateUpdated => {
                self.is_loading = state.is_loading();
            }
            Notification::ErrorEncountered(e) => {
                self.last_error = Some(e.to_string());
            }
            Notification::PlaybackStarted => {
                self.is_playing = state.is_playing();
                self.progress = Some(Progress {
                    current_time: 0.0,
                    duration: None,
                });
                self.last_error = None;
            }
            Notification::CurrentSongUpdated => {
                self.playing_index = state.current_index();
                self.now_playing = state.current_song().cloned();
                if let Some(i) = self.playing_index {
                    self.selected = i;
                }
            }
            Notification::ProgressUpdated {
                current_time,
                duration,
            } => {
                self.progress = Some(Progress {
                    current_time: *current_time,
                    duration: *duration,
                });
            }
        }
    }
}

impl ControllerObserver for RefCell<App> {
    fn notify(&self, state: &ControllerState, notification: &Notification) {
        // The event loop never holds a borrow across a controller call.
        if let Ok(mut app) = self.try_borrow_mut() {
            app.apply(state, notification);
        }
    }
}

/// Format seconds as `MM:SS`. Negative and non-finite values read as zero.
pub fn format_mmss(secs: f64) -> String {
    let secs = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
