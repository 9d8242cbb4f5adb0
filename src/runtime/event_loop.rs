use std::cell::RefCell;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus};
use crate::config;
use crate::controller::Controller;
use crate::engine::PlaybackEngine;
use crate::ui;

/// Longest wait for input between redraws.
const FRAME: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Main terminal event loop: applies controller work, draws, and handles
/// input. Returns `Ok(())` when shutdown is requested.
///
/// The app model is only borrowed for short stretches: controller calls
/// notify it synchronously.
pub fn run<E: PlaybackEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &RefCell<App>,
    controller: &mut Controller<E>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        controller.poll();

        terminal.draw(|f| ui::draw(f, &app.borrow(), &settings.ui, &settings.controls))?;

        let timeout = poll_timeout(controller.next_deadline(), Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Wake up for the next frame, or earlier when a debounced search is due.
fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline
        .map(|d| d.saturating_duration_since(now))
        .map_or(FRAME, |d| d.min(FRAME))
}

fn handle_key_event<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &RefCell<App>,
    controller: &mut Controller<E>,
    state: &mut EventLoopState,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    let focus = app.borrow().focus;
    match focus {
        Focus::Query => {
            state.pending_gg = false;
            handle_query_key(key, app, controller);
            false
        }
        Focus::Results => handle_results_key(key, settings, app, controller, state),
    }
}

fn handle_query_key<E: PlaybackEngine>(
    key: KeyEvent,
    app: &RefCell<App>,
    controller: &mut Controller<E>,
) {
    let query = {
        let mut app = app.borrow_mut();
        let edited = match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Enter | KeyCode::Down => {
                app.focus_results();
                false
            }
            KeyCode::Backspace => app.pop_query_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_query_char(c)
            }
            _ => false,
        };
        if !edited {
            return;
        }
        app.query.clone()
    };

    controller.search(&query);
}

fn handle_results_key<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &RefCell<App>,
    controller: &mut Controller<E>,
    state: &mut EventLoopState,
) -> bool {
    let scrub = settings.controls.scrub_seconds as f64;

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('/') | KeyCode::Tab => {
            state.pending_gg = false;
            app.borrow_mut().focus_query();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.borrow_mut().select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.borrow_mut().select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.borrow_mut().next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.borrow_mut().prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            let selected = {
                let app = app.borrow();
                app.has_songs().then_some(app.selected)
            };
            if let Some(index) = selected {
                // Enter on the playing track keeps it going.
                if !controller.is_currently_playing(index) {
                    controller.select_song(index);
                }
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            controller.toggle_play_pause();
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            controller.next_song();
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            controller.previous_song();
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            let target = app.borrow().scrub_fraction(scrub);
            if let Some(fraction) = target {
                controller.seek(fraction);
            }
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            let target = app.borrow().scrub_fraction(-scrub);
            if let Some(fraction) = target {
                controller.seek(fraction);
            }
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.borrow_mut().toggle_metadata_window();
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
