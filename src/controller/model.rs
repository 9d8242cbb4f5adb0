use std::rc::Weak;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use reqwest::Url;
use tracing::{debug, info, trace, warn};

use crate::config::Settings;
use crate::engine::{EngineEvent, PlaybackEngine};
use crate::search::{Debouncer, SearchClient, SearchError, Track, TransportFailure};

use super::executor::Executor;
use super::notify::{ControllerError, ControllerObserver, Notification};
use super::state::{ControllerState, PlaybackSession};

/// Tunables taken from `Settings`.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// How often the engine reports progress for the playing track.
    pub progress_interval: Duration,
    /// Apply only the result of the latest dispatched search.
    pub discard_stale_results: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_secs(1),
            discard_stale_results: false,
        }
    }
}

impl From<&Settings> for ControllerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            progress_interval: Duration::from_millis(settings.playback.progress_interval_ms),
            discard_stale_results: settings.search.discard_stale_results,
        }
    }
}

/// Work posted back to the controller thread.
enum Inbox {
    SearchFinished {
        ticket: u64,
        result: Result<Vec<Track>, SearchError>,
    },
    Engine {
        session: u64,
        event: EngineEvent,
    },
}

pub struct Controller<E: PlaybackEngine> {
    state: ControllerState,
    engine: E,
    client: Arc<dyn SearchClient>,
    executor: Box<dyn Executor>,
    options: ControllerOptions,

    debouncer: Debouncer<String>,
    /// Ticket of the most recently dispatched search.
    last_ticket: u64,
    /// Searches with a ticket up to this one were superseded by an empty query.
    cleared_through: u64,

    session: Option<PlaybackSession>,
    next_session: u64,
    /// The engine holds an item (even if its session was torn down).
    has_media: bool,

    observer: Option<Weak<dyn ControllerObserver>>,
    inbox_tx: Sender<Inbox>,
    inbox_rx: Receiver<Inbox>,
}

impl<E: PlaybackEngine> Controller<E> {
    pub fn new(
        engine: E,
        client: Arc<dyn SearchClient>,
        executor: Box<dyn Executor>,
        options: ControllerOptions,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel();
        Self {
            state: ControllerState::default(),
            engine,
            client,
            executor,
            options,
            debouncer: Debouncer::new(),
            last_ticket: 0,
            cleared_through: 0,
            session: None,
            next_session: 0,
            has_media: false,
            observer: None,
            inbox_tx,
            inbox_rx,
        }
    }

    /// Register the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Weak<dyn ControllerObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn songs(&self) -> &[Track] {
        self.state.songs()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index()
    }

    pub fn current_song(&self) -> Option<&Track> {
        self.state.current_song()
    }

    pub fn is_currently_playing(&self, index: usize) -> bool {
        self.state.is_currently_playing(index)
    }

    /// When the pending search (if any) is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Request a search for `query`. An empty query clears the list at once;
    /// anything else is debounced.
    pub fn search(&mut self, query: &str) {
        self.search_at(query, Instant::now());
    }

    pub fn search_at(&mut self, query: &str, now: Instant) {
        if query.is_empty() {
            self.debouncer.cancel_pending();
            self.cleared_through = self.last_ticket;
            self.replace_songs(Vec::new());
            return;
        }

        let due = self.debouncer.schedule(query.to_string(), now);
        trace!(query, ?due, "search scheduled");
    }

    /// Fire a due search and apply everything posted to the inbox.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    pub fn poll_at(&mut self, now: Instant) {
        if let Some(query) = self.debouncer.fire_due(now) {
            self.dispatch_search(query);
        }

        while let Ok(msg) = self.inbox_rx.try_recv() {
            match msg {
                Inbox::SearchFinished { ticket, result } => self.finish_search(ticket, result),
                Inbox::Engine { session, event } => self.handle_engine_event(session, event),
            }
        }
    }

    /// Start playing the track at `index`. Out-of-range indices are ignored.
    pub fn select_song(&mut self, index: usize) {
        if index >= self.state.songs.len() {
            debug!(index, len = self.state.songs.len(), "ignoring out-of-range selection");
            return;
        }

        self.state.current_index = Some(index);
        self.teardown_session();

        let raw = self.state.songs[index].preview_url.clone();
        let url = match resolve_media_url(&raw) {
            Ok(url) => url,
            Err(reason) => {
                warn!(url = raw.as_str(), "cannot play track: {reason}");
                self.emit(Notification::ErrorEncountered(
                    ControllerError::PlaybackResource { url: raw, reason },
                ));
                return;
            }
        };

        info!(index, %url, "playing track");
        self.engine.load(&url);
        self.engine.play();
        self.has_media = true;

        let was_playing = self.state.is_playing;
        self.state.is_playing = true;
        self.emit(Notification::CurrentSongUpdated);
        if !was_playing {
            self.emit(Notification::PlayingStateUpdated);
        }
        self.emit(Notification::PlaybackStarted);

        self.next_session += 1;
        let session = self.next_session;
        let tx = self.inbox_tx.clone();
        let token = self.engine.observe(
            self.options.progress_interval,
            Box::new(move |event| {
                let _ = tx.send(Inbox::Engine { session, event });
            }),
        );
        self.session = Some(PlaybackSession {
            id: session,
            token,
            url,
        });
    }

    /// Pause when playing, resume otherwise. Ignored until something was loaded.
    pub fn toggle_play_pause(&mut self) {
        if !self.has_media {
            return;
        }

        if self.state.is_playing {
            self.engine.pause();
        } else {
            self.engine.play();
        }
        self.state.is_playing = !self.state.is_playing;
        self.emit(Notification::PlayingStateUpdated);
    }

    /// Play the following track, wrapping to the first.
    pub fn next_song(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        let count = self.state.songs.len();
        self.select_song((current + 1) % count);
    }

    /// Play the preceding track, wrapping to the last.
    pub fn previous_song(&mut self) {
        let Some(current) = self.state.current_index else {
            return;
        };
        let count = self.state.songs.len();
        self.select_song((current + count - 1) % count);
    }

    /// Seek the loaded item to `fraction` of its duration.
    pub fn seek(&mut self, fraction: f64) {
        if !self.has_media || fraction.is_nan() {
            return;
        }
        self.engine.seek(fraction.clamp(0.0, 1.0));
    }

    /// Detach from the engine. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.teardown_session();
    }

    fn dispatch_search(&mut self, query: String) {
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.set_loading(true);

        info!(query = query.as_str(), ticket, "searching");
        let client = Arc::clone(&self.client);
        let tx = self.inbox_tx.clone();
        let job = Box::new(move || {
            let result = client.search(&query);
            let _ = tx.send(Inbox::SearchFinished { ticket, result });
        });

        if let Err(e) = self.executor.execute(job) {
            warn!("failed to start search worker: {e}");
            let _ = self.inbox_tx.send(Inbox::SearchFinished {
                ticket,
                result: Err(TransportFailure::Request(e.to_string()).into()),
            });
        }
    }

    fn finish_search(&mut self, ticket: u64, result: Result<Vec<Track>, SearchError>) {
        if self.options.discard_stale_results {
            if ticket != self.last_ticket {
                debug!(ticket, latest = self.last_ticket, "dropping superseded search result");
                return;
            }
            if ticket <= self.cleared_through {
                debug!(ticket, "dropping search result for a cleared query");
                self.set_loading(false);
                return;
            }
        }

        self.set_loading(false);
        match result {
            Ok(songs) => {
                info!(ticket, count = songs.len(), "search results ready");
                self.replace_songs(songs);
            }
            Err(e) => {
                warn!(ticket, "search failed: {e}");
                self.replace_songs(Vec::new());
                self.emit(Notification::ErrorEncountered(e.into()));
            }
        }
    }

    fn handle_engine_event(&mut self, session: u64, event: EngineEvent) {
        if self.session.as_ref().is_none_or(|s| s.id != session) {
            trace!(session, "ignoring event from a finished session");
            return;
        }

        match event {
            EngineEvent::Progress {
                current_time,
                duration,
            } => self.emit(Notification::ProgressUpdated {
                current_time,
                duration,
            }),
            EngineEvent::ReachedEnd => {
                debug!(session, "track finished");
                self.next_song();
            }
            EngineEvent::Failed(reason) => {
                warn!(session, "playback failed: {reason}");
                // Nothing is loaded any more; toggling must wait for a new selection.
                self.has_media = false;
                if self.state.is_playing {
                    self.state.is_playing = false;
                    self.emit(Notification::PlayingStateUpdated);
                }
                self.emit(Notification::ErrorEncountered(ControllerError::Playback(
                    reason,
                )));
            }
        }
    }

    /// A new list always invalidates the selection.
    fn replace_songs(&mut self, songs: Vec<Track>) {
        self.state.songs = songs;
        self.state.current_index = None;
        self.emit(Notification::SongsUpdated);
    }

    fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
        self.emit(Notification::LoadingStateUpdated);
    }

    fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session = session.id, url = %session.url, "tearing down playback session");
            self.engine.remove_observer(session.token);
        }
    }

    fn emit(&self, notification: Notification) {
        trace!(?notification, "notify");
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.notify(&self.state, &notification);
        }
    }
}

impl<E: PlaybackEngine> Drop for Controller<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Parse a track's preview URL into something the engine can load.
pub fn resolve_media_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(format!("unsupported scheme {other:?}")),
    }
}
