//! Fetching media bytes and turning them into a paused `rodio` sink.

use std::io::Cursor;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink, Source};

/// Read the whole media item behind `url`. `file://` URLs are read from disk,
/// everything else goes through `http`.
pub(super) fn fetch_media(http: &Client, url: &Url) -> Result<Vec<u8>, String> {
    if url.scheme() == "file" {
        let path = url
            .to_file_path()
            .map_err(|_| format!("not a local path: {url}"))?;
        return std::fs::read(&path).map_err(|e| format!("{}: {e}", path.display()));
    }

    let response = http
        .get(url.clone())
        .send()
        .map_err(|e| format!("failed to fetch {url}: {e}"))?;
    if !response.status().is_success() {
        return Err(format!("failed to fetch {url}: HTTP {}", response.status()));
    }
    let bytes = response
        .bytes()
        .map_err(|e| format!("failed to read {url}: {e}"))?;
    if bytes.is_empty() {
        return Err(format!("no data received from {url}"));
    }
    Ok(bytes.to_vec())
}

/// Decode `bytes` into a paused sink on `stream`, returning the total
/// duration when the container reports one.
pub(super) fn create_sink(
    stream: &OutputStream,
    bytes: Vec<u8>,
) -> Result<(Sink, Option<Duration>), String> {
    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| format!("failed to decode media: {e}"))?;
    let duration = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}

/// Absolute position for a fractional seek, or `None` when the duration is
/// unknown.
pub(super) fn seek_target(duration: Option<Duration>, fraction: f64) -> Option<Duration> {
    let total = duration?;
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    Some(total.mul_f64(fraction))
}
