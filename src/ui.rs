//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Focus, format_mmss};
use crate::config::{ControlsSettings, UiSettings};

const PLAYING_MARKER: &str = "♪ ";
const IDLE_MARKER: &str = "  ";

/// Render the controls help text for the focused pane.
fn controls_text(focus: Focus, scrub_seconds: u64) -> String {
    let keys: Vec<String> = match focus {
        Focus::Query => vec![
            "[type] search".to_string(),
            "[tab/esc/enter] results".to_string(),
            "[ctrl-c] quit".to_string(),
        ],
        Focus::Results => vec![
            "[j/k] up/down".to_string(),
            "[gg/G] top/bottom".to_string(),
            "[enter] play selected song".to_string(),
            "[space/p] play/pause".to_string(),
            "[h/l] prev/next song".to_string(),
            format!("[H/L] scrub -/+{scrub_seconds}s"),
            "[K] details".to_string(),
            "[/] search".to_string(),
            "[q] quit".to_string(),
        ],
    };
    keys.join(" | ")
}

/// Build the now-playing line: title, then artist and album.
fn now_playing_text(app: &App, ui: &UiSettings) -> String {
    let Some(track) = app.now_playing.as_ref() else {
        return "Nothing playing".to_string();
    };

    let mut parts: Vec<&str> = Vec::new();
    for s in [&track.title, &track.artist, &track.collection_name] {
        let s = s.trim();
        if !s.is_empty() {
            parts.push(s);
        }
    }
    let state = if app.is_playing { "Playing" } else { "Paused" };
    format!("{state}: {}", parts.join(&ui.now_playing_separator))
}

/// `MM:SS / MM:SS` for the transport gauge.
fn time_label(app: &App) -> String {
    match app.progress {
        Some(p) => {
            let total = p.duration.map(format_mmss).unwrap_or_else(|| "--:--".to_string());
            format!("{} / {}", format_mmss(p.current_time), total)
        }
        None => "--:-- / --:--".to_string(),
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn pane(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, controls: &ControlsSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Search box
    let search_title = if app.is_loading {
        " search (loading…) "
    } else {
        " search "
    };
    let search = Paragraph::new(app.query.as_str())
        .block(pane(search_title, app.focus == Focus::Query).padding(Padding::horizontal(1)));
    frame.render_widget(search, chunks[1]);
    if app.focus == Focus::Query {
        let width = app.query.chars().count() as u16;
        let x = (chunks[1].x + 2 + width).min(chunks[1].right().saturating_sub(2));
        frame.set_cursor_position((x, chunks[1].y + 1));
    }

    // Results
    let results_block = pane(" results ", app.focus == Focus::Results);
    if app.has_songs() {
        let items: Vec<ListItem> = app
            .songs
            .iter()
            .enumerate()
            .map(|(i, song)| {
                let marker = if app.is_row_playing(i) {
                    PLAYING_MARKER
                } else {
                    IDLE_MARKER
                };
                let line = Line::from(vec![
                    Span::raw(marker),
                    Span::raw(song.title.as_str()).bold(),
                    Span::raw(ui_settings.now_playing_separator.as_str()),
                    Span::raw(song.artist.as_str()).dim(),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(results_block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(app.selected.min(app.songs.len() - 1)));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    } else {
        let empty = Paragraph::new(ui_settings.empty_text.as_str())
            .alignment(Alignment::Center)
            .italic()
            .block(results_block);
        frame.render_widget(empty, chunks[2]);
    }

    // Details popup
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 10, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let meta = match app.selected_song() {
            Some(track) => format!(
                "Title: {}\nArtist: {}\nAlbum: {}\nTrack ID: {}\nPreview: {}\nArtwork: {}",
                track.title,
                track.artist,
                track.collection_name,
                track.id,
                track.preview_url,
                track.artwork_url
            ),
            None => "No track selected".to_string(),
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding::left(1))
                    .borders(Borders::ALL)
                    .title(" details (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    // Transport
    let transport_block = Block::default().borders(Borders::ALL).title(" now playing ");
    let transport_area = transport_block.inner(chunks[3]);
    frame.render_widget(transport_block, chunks[3]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(transport_area);

    frame.render_widget(
        Paragraph::new(now_playing_text(app, ui_settings)).slow_blink(),
        rows[0],
    );
    let ratio = app.progress.and_then(|p| p.ratio()).unwrap_or(0.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(time_label(app));
    frame.render_widget(gauge, rows[1]);

    // Footer: the last error, if any, then key help.
    let mut lines: Vec<Line> = Vec::new();
    if let Some(err) = &app.last_error {
        lines.push(Line::from(Span::raw(format!("error: {err}")).fg(Color::Red)));
    }
    lines.push(Line::from(controls_text(app.focus, controls.scrub_seconds)));
    let footer = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding::left(1)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
