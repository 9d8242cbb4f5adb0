use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::SearchSettings;

use super::model::{SearchError, Track, TransportFailure, parse_response};

/// Media filter sent with every request; only music is searched.
pub const MEDIA_MUSIC: &str = "music";

/// Anything that can turn a search term into a list of tracks.
///
/// Implementations are called off the controller thread, once per effective
/// query, and must not retry on their own.
pub trait SearchClient: Send + Sync {
    fn search(&self, term: &str) -> Result<Vec<Track>, SearchError>;
}

/// Blocking HTTP client for the catalog search endpoint.
pub struct HttpSearchClient {
    http: Client,
    endpoint: String,
    country: String,
}

impl HttpSearchClient {
    /// Build a client with its own reusable HTTP session.
    pub fn new(settings: &SearchSettings) -> Result<Self, SearchError> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| SearchError::InvalidRequest(e.to_string()))?;
        Ok(Self::with_http(http, settings))
    }

    /// Build a client around an existing HTTP session.
    pub fn with_http(http: Client, settings: &SearchSettings) -> Self {
        Self {
            http,
            endpoint: settings.endpoint.clone(),
            country: settings.country.clone(),
        }
    }

    /// Compose the request URL for `term`.
    pub fn request_url(&self, term: &str) -> Result<Url, SearchError> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("term", term),
                ("country", self.country.as_str()),
                ("media", MEDIA_MUSIC),
            ],
        )
        .map_err(|e| SearchError::InvalidRequest(format!("{}: {e}", self.endpoint)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchError::InvalidRequest(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

impl SearchClient for HttpSearchClient {
    fn search(&self, term: &str) -> Result<Vec<Track>, SearchError> {
        let url = self.request_url(term)?;
        debug!(%url, "searching catalog");

        let response = self.http.get(url).send().map_err(|e| {
            warn!("search request failed: {e}");
            if e.is_builder() {
                SearchError::InvalidRequest(e.to_string())
            } else {
                TransportFailure::Request(e.to_string()).into()
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "search endpoint returned an error status");
            return Err(TransportFailure::Status(status.as_u16()).into());
        }

        let body = response
            .bytes()
            .map_err(|e| TransportFailure::Request(e.to_string()))?;
        let tracks = parse_response(&body)?;
        debug!(term, count = tracks.len(), "search finished");
        Ok(tracks)
    }
}
