use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use super::*;
use crate::controller::{
    Controller, ControllerError, ControllerObserver, ControllerOptions, Executor, Job, Notification,
};
use crate::engine::{EventCallback, ObserverToken, PlaybackEngine};
use crate::search::{SEARCH_DEBOUNCE, SearchClient, SearchError, Track};

struct NullEngine;

impl PlaybackEngine for NullEngine {
    fn load(&mut self, _url: &reqwest::Url) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _fraction: f64) {}
    fn observe(&mut self, _interval: std::time::Duration, _cb: EventCallback) -> ObserverToken {
        ObserverToken(1)
    }
    fn remove_observer(&mut self, _token: ObserverToken) {}
}

struct Canned(Vec<Track>);

impl SearchClient for Canned {
    fn search(&self, _term: &str) -> Result<Vec<Track>, SearchError> {
        Ok(self.0.clone())
    }
}

struct Inline;

impl Executor for Inline {
    fn execute(&self, job: Job) -> std::io::Result<()> {
        job();
        Ok(())
    }
}

fn t(id: i64, title: &str) -> Track {
    Track {
        id,
        title: title.into(),
        artist: "Artist".into(),
        preview_url: format!("https://example.com/{id}.m4a"),
        artwork_url: String::new(),
        collection_name: "Album".into(),
    }
}

fn wired(tracks: Vec<Track>) -> (Rc<RefCell<App>>, Controller<NullEngine>) {
    let app = Rc::new(RefCell::new(App::new("")));
    let mut controller = Controller::new(
        NullEngine,
        Arc::new(Canned(tracks)),
        Box::new(Inline),
        ControllerOptions::default(),
    );
    let observer: Rc<dyn ControllerObserver> = app.clone();
    controller.set_observer(Rc::downgrade(&observer));

    let t0 = Instant::now();
    controller.search_at("q", t0);
    controller.poll_at(t0 + SEARCH_DEBOUNCE);
    (app, controller)
}

#[test]
fn format_mmss_pads_and_floors() {
    assert_eq!(format_mmss(0.0), "00:00");
    assert_eq!(format_mmss(29.98), "00:29");
    assert_eq!(format_mmss(61.0), "01:01");
    assert_eq!(format_mmss(3600.0), "60:00");
    assert_eq!(format_mmss(-3.0), "00:00");
    assert_eq!(format_mmss(f64::NAN), "00:00");
}

#[test]
fn query_editing_ignores_control_chars() {
    let mut app = App::new("ja");
    assert!(app.push_query_char('c'));
    assert!(!app.push_query_char('\u{7}'));
    assert_eq!(app.query, "jac");

    assert!(app.pop_query_char());
    assert!(app.pop_query_char());
    assert!(app.pop_query_char());
    assert!(!app.pop_query_char());
    assert!(app.query.is_empty());
}

#[test]
fn cursor_wraps_and_ignores_empty_list() {
    let mut app = App::new("");
    app.next();
    app.prev();
    assert_eq!(app.selected, 0);

    app.songs = vec![t(1, "a"), t(2, "b"), t(3, "c")];
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.select_last();
    assert_eq!(app.selected_song().map(|s| s.id), Some(3));
    app.select_first();
    assert_eq!(app.selected, 0);
}

#[test]
fn scrub_fraction_needs_duration_and_clamps() {
    let mut app = App::new("");
    assert_eq!(app.scrub_fraction(5.0), None);

    app.progress = Some(Progress {
        current_time: 10.0,
        duration: None,
    });
    assert_eq!(app.scrub_fraction(5.0), None);

    app.progress = Some(Progress {
        current_time: 10.0,
        duration: Some(30.0),
    });
    assert_eq!(app.scrub_fraction(5.0), Some(0.5));
    assert_eq!(app.scrub_fraction(-20.0), Some(0.0));
    assert_eq!(app.scrub_fraction(60.0), Some(1.0));
}

#[test]
fn observer_mirrors_search_results() {
    let (app, controller) = wired(vec![t(1, "Upside Down"), t(2, "Banana Pancakes")]);
    let app = app.borrow();

    assert_eq!(app.songs.len(), 2);
    assert_eq!(app.songs, controller.songs());
    assert!(!app.is_loading);
    assert_eq!(app.playing_index, None);
}

#[test]
fn observer_follows_playing_track() {
    let (app, mut controller) = wired(vec![t(1, "a"), t(2, "b"), t(3, "c")]);

    controller.select_song(2);
    {
        let app = app.borrow();
        assert_eq!(app.selected, 2);
        assert!(app.is_row_playing(2));
        assert_eq!(app.now_playing.as_ref().map(|s| s.id), Some(3));
        assert_eq!(
            app.progress,
            Some(Progress {
                current_time: 0.0,
                duration: None
            })
        );
    }

    controller.toggle_play_pause();
    assert!(!app.borrow().is_playing);
    assert!(!app.borrow().is_row_playing(2));
}

#[test]
fn errors_are_kept_until_playback_starts() {
    let mut app = App::new("");
    let state = crate::controller::ControllerState::default();

    app.apply(
        &state,
        &Notification::ErrorEncountered(ControllerError::Playback("boom".into())),
    );
    assert_eq!(app.last_error.as_deref(), Some("playback failed: boom"));

    app.apply(&state, &Notification::PlaybackStarted);
    assert_eq!(app.last_error, None);
}

#[test]
fn progress_ratio_is_clamped() {
    let p = Progress {
        current_time: 45.0,
        duration: Some(30.0),
    };
    assert_eq!(p.ratio(), Some(1.0));

    let p = Progress {
        current_time: 15.0,
        duration: Some(30.0),
    };
    assert_eq!(p.ratio(), Some(0.5));

    let p = Progress {
        current_time: 1.0,
        duration: Some(0.0),
    };
    assert_eq!(p.ratio(), None);
}

#[test]
fn busy_model_skips_notification_instead_of_panicking() {
    let app = RefCell::new(App::new(""));
    let state = crate::controller::ControllerState::default();
    let _held = app.borrow_mut();
    app.notify(&state, &Notification::LoadingStateUpdated);
}
