use std::time::{Duration, Instant};

use reqwest::Url;
use reqwest::blocking::Client;

use super::EngineEvent;
use super::source::{fetch_media, seek_target};
use super::state::{LoadState, TickState};

#[test]
fn seek_target_scales_by_fraction() {
    let total = Some(Duration::from_secs(30));
    assert_eq!(seek_target(total, 0.5), Some(Duration::from_secs(15)));
    assert_eq!(seek_target(total, 0.0), Some(Duration::ZERO));
    assert_eq!(seek_target(total, 1.0), Some(Duration::from_secs(30)));
}

#[test]
fn seek_target_clamps_out_of_range_fractions() {
    let total = Some(Duration::from_secs(30));
    assert_eq!(seek_target(total, -0.3), Some(Duration::ZERO));
    assert_eq!(seek_target(total, 1.7), Some(Duration::from_secs(30)));
    assert_eq!(seek_target(total, f64::NAN), Some(Duration::ZERO));
}

#[test]
fn seek_target_is_none_without_duration() {
    assert_eq!(seek_target(None, 0.5), None);
}

#[test]
fn fetch_media_reads_file_urls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.m4a");
    std::fs::write(&path, b"not really audio").unwrap();

    let url = Url::from_file_path(&path).unwrap();
    let bytes = fetch_media(&Client::new(), &url).unwrap();
    assert_eq!(bytes, b"not really audio");
}

#[test]
fn fetch_media_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let url = Url::from_file_path(dir.path().join("absent.m4a")).unwrap();

    let err = fetch_media(&Client::new(), &url).unwrap_err();
    assert!(err.contains("absent.m4a"), "unexpected error: {err}");
}

const INTERVAL: Duration = Duration::from_secs(1);
const TOTAL: Option<Duration> = Some(Duration::from_secs(30));

fn tick(state: &mut TickState, playing: bool, drained: bool, at: Instant) -> Option<EngineEvent> {
    state.advance(playing, drained, at, INTERVAL, Duration::from_secs(3), TOTAL)
}

#[test]
fn progress_is_reported_once_per_interval() {
    let start = Instant::now();
    let mut state = TickState::default();

    match tick(&mut state, true, false, start) {
        Some(EngineEvent::Progress {
            current_time,
            duration,
        }) => {
            assert_eq!(current_time, 3.0);
            assert_eq!(duration, Some(30.0));
        }
        other => panic!("expected progress, got {other:?}"),
    }
    assert!(tick(&mut state, true, false, start + Duration::from_millis(300)).is_none());
    assert!(tick(&mut state, true, false, start + Duration::from_millis(900)).is_none());
    assert!(matches!(
        tick(&mut state, true, false, start + INTERVAL),
        Some(EngineEvent::Progress { .. })
    ));
}

#[test]
fn nothing_is_reported_while_paused() {
    let start = Instant::now();
    let mut state = TickState::default();

    assert!(tick(&mut state, false, false, start).is_none());
    assert!(tick(&mut state, false, true, start + INTERVAL).is_none());
    // A drained sink while paused is not the end.
    assert!(matches!(
        tick(&mut state, true, false, start + INTERVAL * 2),
        Some(EngineEvent::Progress { .. })
    ));
}

#[test]
fn end_is_reported_exactly_once() {
    let start = Instant::now();
    let mut state = TickState::default();

    assert!(matches!(
        tick(&mut state, true, true, start),
        Some(EngineEvent::ReachedEnd)
    ));
    for n in 1..5 {
        assert!(tick(&mut state, true, true, start + INTERVAL * n).is_none());
    }
    assert!(tick(&mut state, true, false, start + INTERVAL * 10).is_none());
}

#[test]
fn reset_interval_allows_immediate_progress() {
    let start = Instant::now();
    let mut state = TickState::default();

    assert!(tick(&mut state, true, false, start).is_some());
    assert!(tick(&mut state, true, false, start + Duration::from_millis(100)).is_none());
    state.reset_interval();
    assert!(tick(&mut state, true, false, start + Duration::from_millis(200)).is_some());
}

#[test]
fn unknown_duration_is_reported_as_none() {
    let mut state = TickState::default();
    let event = state.advance(true, false, Instant::now(), INTERVAL, Duration::ZERO, None);
    assert!(matches!(
        event,
        Some(EngineEvent::Progress { duration: None, .. })
    ));
}

#[test]
fn media_from_a_superseded_load_is_rejected() {
    let mut load = LoadState::default();
    let first = load.begin_load();
    let second = load.begin_load();

    assert_ne!(first, second);
    assert!(!load.accepts(first));
    assert!(load.accepts(second));
}

#[test]
fn play_before_arrival_carries_over_to_the_loaded_media() {
    let mut load = LoadState::default();
    load.begin_load();
    assert!(!load.want_playing());

    load.set_playing(true);
    assert!(load.want_playing());

    load.set_playing(false);
    assert!(!load.want_playing());
}

#[test]
fn new_load_forgets_the_previous_play_request() {
    let mut load = LoadState::default();
    load.begin_load();
    load.set_playing(true);

    load.begin_load();
    assert!(!load.want_playing());
}

#[test]
fn failure_without_observer_is_delivered_once() {
    let mut load = LoadState::default();
    load.begin_load();
    load.defer_failure("failed to start fetch".to_string());

    assert_eq!(load.take_failure().as_deref(), Some("failed to start fetch"));
    assert_eq!(load.take_failure(), None);
}

#[test]
fn new_load_drops_an_unreported_failure() {
    let mut load = LoadState::default();
    load.begin_load();
    load.defer_failure("decode error".to_string());

    load.begin_load();
    assert_eq!(load.take_failure(), None);
}
