//! Search result types and the decoder for the catalog's JSON payload.

use serde::Deserialize;
use thiserror::Error;

/// A single catalog track, normalized from the search API payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Playable preview clip.
    pub preview_url: String,
    pub artwork_url: String,
    pub collection_name: String,
}

/// Top-level body returned by the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    track_id: i64,
    track_name: String,
    artist_name: String,
    preview_url: String,
    #[serde(rename = "artworkUrl100")]
    artwork_url: String,
    collection_name: String,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        Self {
            id: raw.track_id,
            title: raw.track_name,
            artist: raw.artist_name,
            preview_url: raw.preview_url,
            artwork_url: raw.artwork_url,
            collection_name: raw.collection_name,
        }
    }
}

/// Low-level reason a search request never produced a usable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("no data received")]
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Transport(#[from] TransportFailure),
    #[error("could not decode search response: {0}")]
    Decode(String),
}

/// Decode a raw response body into tracks.
///
/// An empty body is reported as a transport failure rather than a decode
/// failure: the server answered but sent nothing to decode.
pub fn parse_response(body: &[u8]) -> Result<Vec<Track>, SearchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(TransportFailure::NoData.into());
    }

    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| SearchError::Decode(e.to_string()))?;

    Ok(response.results.into_iter().map(Track::from).collect())
}
