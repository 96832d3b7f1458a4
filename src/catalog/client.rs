//! Deezer HTTP client
//!
//! Handles communication with the Deezer public API.
//! See: https://developers.deezer.com/api
//!
//! ## API Quirks
//!
//! ### Errors arrive with HTTP 200
//! The API almost never uses HTTP status codes. Failures come back as
//! `{"error": {"type": ..., "message": ..., "code": ...}}` with status 200.
//! Code 800 ("no data") is how a missing resource is reported.
//!
//! ### The `id == 0` sentinel
//! Single-resource lookups for unknown ids sometimes return a normal-looking
//! object with `"id": 0` and no error field. Both forms mean "not found".
//!
//! ### Lists
//! List endpoints wrap results in `{"data": [...]}`. Entries that don't
//! decode are dropped one by one; a missing or non-list `data` is reported as
//! [`CatalogError::MalformedPayload`] and each caller decides whether that
//! means "empty" or "failed".
//!
//! No call is retried; every request carries its own timeout.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::domain::{CatalogError, SearchLimits};
use super::dto;
use crate::config::CatalogConfig;

/// Deezer error code for "no data" (unknown id)
const NO_DATA_CODE: i64 = 800;

/// Deezer API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    search_timeout: Duration,
}

impl CatalogClient {
    /// Create a new client
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send a User-Agent header identifying the application
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let user_agent = config.user_agent.clone().unwrap_or_else(|| {
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
        });

        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CatalogError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            search_timeout: Duration::from_secs(config.search_timeout_secs),
        })
    }

    /// Look up a single track
    pub async fn fetch_track(&self, id: &str) -> Result<dto::Track, CatalogError> {
        let url = format!("{}/track/{}", self.base_url, urlencoding::encode(id));
        let body = self.get_json(&url, self.timeout, "track").await?;
        parse_single(body, "track")
    }

    /// Artists chart
    pub async fn top_artists(&self, limit: usize) -> Result<Vec<dto::Artist>, CatalogError> {
        let url = format!("{}/chart/0/artists?limit={}", self.base_url, limit);
        let body = self.get_json(&url, self.timeout, "chart artists").await?;
        parse_list(body, "chart artists")
    }

    /// Tracks chart
    pub async fn top_tracks(&self, limit: usize) -> Result<Vec<dto::Track>, CatalogError> {
        let url = format!("{}/chart/0/tracks?limit={}", self.base_url, limit);
        let body = self.get_json(&url, self.timeout, "chart tracks").await?;
        parse_list(body, "chart tracks")
    }

    /// Playlists chart
    pub async fn top_playlists(&self, limit: usize) -> Result<Vec<dto::Playlist>, CatalogError> {
        let url = format!("{}/chart/0/playlists?limit={}", self.base_url, limit);
        let body = self.get_json(&url, self.timeout, "chart playlists").await?;
        parse_list(body, "chart playlists")
    }

    /// Look up an artist profile
    pub async fn fetch_artist(&self, id: &str) -> Result<dto::Artist, CatalogError> {
        let url = format!("{}/artist/{}", self.base_url, urlencoding::encode(id));
        let body = self.get_json(&url, self.timeout, "artist").await?;
        parse_single(body, "artist")
    }

    /// An artist's most popular tracks
    pub async fn artist_top_tracks(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<dto::Track>, CatalogError> {
        let url = format!(
            "{}/artist/{}/top?limit={}",
            self.base_url,
            urlencoding::encode(id),
            limit
        );
        let body = self.get_json(&url, self.timeout, "artist top tracks").await?;
        parse_list(body, "artist top tracks")
    }

    /// Look up an editorial playlist with its tracks
    pub async fn fetch_playlist(&self, id: &str) -> Result<dto::PlaylistDetail, CatalogError> {
        let url = format!("{}/playlist/{}", self.base_url, urlencoding::encode(id));
        let body = self.get_json(&url, self.search_timeout, "playlist").await?;
        parse_single(body, "playlist")
    }

    /// Editorial new releases
    pub async fn new_releases(&self, limit: usize) -> Result<Vec<dto::Album>, CatalogError> {
        let url = format!("{}/editorial/0/releases?limit={}", self.base_url, limit);
        let body = self.get_json(&url, self.timeout, "new releases").await?;
        parse_list(body, "new releases")
    }

    /// Mixed search. Fetches more hits than requested so each bucket can
    /// still be filled after filtering.
    pub async fn search(
        &self,
        query: &str,
        limits: &SearchLimits,
    ) -> Result<Vec<dto::SearchHit>, CatalogError> {
        let url = format!(
            "{}/search?q={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limits.fetch_limit()
        );
        let body = self.get_json(&url, self.search_timeout, "search").await?;
        parse_list(body, "search")
    }

    /// Send a GET and decode the body as JSON, mapping catalog error payloads
    async fn get_json(
        &self,
        url: &str,
        timeout: Duration,
        operation: &str,
    ) -> Result<Value, CatalogError> {
        tracing::debug!(operation, url, "Catalog request");

        let response = self
            .http_client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("request timed out after {}s", timeout.as_secs())
                } else {
                    e.to_string()
                };
                tracing::error!(operation, url, "Catalog request failed: {}", message);
                CatalogError::Network(message)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(operation, url, status = status.as_u16(), "Catalog returned HTTP error");
            return Err(CatalogError::Http {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| {
            tracing::error!(operation, url, "Failed to read catalog response: {}", e);
            CatalogError::Network(e.to_string())
        })?;

        parse_envelope(&text, operation)
    }
}

/// Decode a body and surface `{"error": ...}` payloads as errors
pub(crate) fn parse_envelope(text: &str, operation: &str) -> Result<Value, CatalogError> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        tracing::error!(operation, "Catalog response is not valid JSON: {}", e);
        CatalogError::InvalidResponse(e.to_string())
    })?;

    if let Some(error) = value.get("error") {
        let api_error: dto::ApiError = serde_json::from_value(error.clone()).unwrap_or_default();
        tracing::error!(operation, error = %error, "Catalog reported an error");
        if api_error.code == Some(NO_DATA_CODE) {
            return Err(CatalogError::NotFound);
        }
        let message = api_error
            .message
            .or(api_error.kind)
            .unwrap_or_else(|| error.to_string());
        return Err(CatalogError::Api(message));
    }

    Ok(value)
}

/// Decode a single-resource body, treating `id == 0` as not found
pub(crate) fn parse_single<T: DeserializeOwned>(
    value: Value,
    operation: &str,
) -> Result<T, CatalogError> {
    if is_zero_id(value.get("id")) {
        tracing::error!(operation, "Catalog returned the id == 0 not-found sentinel");
        return Err(CatalogError::NotFound);
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::error!(operation, "Could not decode catalog {}: {}", operation, e);
        CatalogError::InvalidResponse(e.to_string())
    })
}

/// Decode a `{"data": [...]}` body, dropping entries that don't decode
pub(crate) fn parse_list<T: DeserializeOwned>(
    mut value: Value,
    operation: &str,
) -> Result<Vec<T>, CatalogError> {
    let Some(Value::Array(items)) = value.get_mut("data").map(Value::take) else {
        tracing::warn!(operation, "'data' key missing or not a list in catalog response");
        return Err(CatalogError::MalformedPayload(format!(
            "{}: 'data' missing or not a list",
            operation
        )));
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(operation, "Skipping undecodable entry: {}", e);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::warn!(
            operation,
            "Dropped {} of {} undecodable entries",
            total - decoded.len(),
            total
        );
    }

    Ok(decoded)
}

fn is_zero_id(id: Option<&Value>) -> bool {
    match id {
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        Some(Value::String(s)) => s.trim() == "0",
        _ => false,
    }
}
