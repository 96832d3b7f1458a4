//! Normalized catalog records and catalog failure types.
//!
//! These types are OUR types - they don't change when the catalog API changes.
//! All API payloads get converted into these types via [`super::adapter`].

use serde::Serialize;

use crate::error::FailureKind;

/// A playable track as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Catalog track ID
    pub id: String,
    /// Short title when available, full title otherwise
    pub title: String,
    pub artist_name: String,
    /// Catalog artist ID (search results only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    pub album_cover_medium: Option<String>,
    /// Duration in `M:SS` format
    pub duration_formatted: String,
    pub duration_seconds: Option<i64>,
    pub preview_url: Option<String>,
    /// Popularity rank, passed through from the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Viewer-specific liked flag, set by annotation only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

/// Artist card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub picture_medium: Option<String>,
}

/// Album card from search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub picture_medium: Option<String>,
    pub artist_name: Option<String>,
    pub artist_id: Option<String>,
}

/// Editorial playlist card from the charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
    pub picture_medium: Option<String>,
    /// Description, or "By {creator}" when there is none
    pub subtitle: String,
    pub link: Option<String>,
}

/// New album release card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumRelease {
    pub id: String,
    pub title: String,
    pub picture_medium: Option<String>,
    pub artist_name: String,
    pub artist_id: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<String>,
}

/// Artist profile with top tracks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    pub picture_small: Option<String>,
    pub picture_medium: Option<String>,
    pub picture_big: Option<String>,
    pub picture_xl: Option<String>,
    pub nb_album: Option<i64>,
    pub nb_fan: Option<i64>,
    pub link: Option<String>,
    pub top_tracks: Vec<Track>,
}

/// Catalog (editorial) playlist with its tracks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistDetail {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_total_formatted: String,
    pub nb_tracks: Option<i64>,
    pub fans: Option<i64>,
    pub link: Option<String>,
    pub picture_small: Option<String>,
    pub picture_medium: Option<String>,
    pub picture_big: Option<String>,
    pub picture_xl: Option<String>,
    pub creator_name: String,
    pub creator_id: Option<String>,
    pub tracks: Vec<Track>,
}

/// Per-bucket result limits for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub tracks: usize,
    pub artists: usize,
    pub albums: usize,
}

impl SearchLimits {
    /// Headroom fetched beyond the largest bucket to survive filtering.
    pub const FETCH_HEADROOM: usize = 15;

    pub fn new(tracks: usize, artists: usize, albums: usize) -> Self {
        Self {
            tracks,
            artists,
            albums,
        }
    }

    /// Number of hits to request from the catalog.
    pub fn fetch_limit(&self) -> usize {
        self.tracks.max(self.artists).max(self.albums) + Self::FETCH_HEADROOM
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::new(10, 6, 6)
    }
}

/// Bucketed search results in catalog relevance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub tracks: Vec<Track>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
}

impl SearchResults {
    /// Whether any bucket has entries.
    pub fn has_results(&self) -> bool {
        !self.tracks.is_empty() || !self.artists.is_empty() || !self.albums.is_empty()
    }
}

/// Errors returned by catalog calls
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status} from catalog")]
    Http { status: u16 },

    /// Body was not JSON or could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Catalog-level error payload
    #[error("Catalog error: {0}")]
    Api(String),

    /// `id == 0` sentinel or a not-found error payload
    #[error("Not found in catalog")]
    NotFound,

    /// JSON decoded but the `data` list is missing
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl CatalogError {
    /// Machine-readable failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            CatalogError::Network(_) | CatalogError::Http { .. } => FailureKind::NetworkError,
            CatalogError::InvalidResponse(_) => FailureKind::InvalidResponse,
            CatalogError::Api(_) | CatalogError::NotFound => FailureKind::CatalogError,
            CatalogError::MalformedPayload(_) => FailureKind::MalformedPayload,
        }
    }

    /// Whether the catalog reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound)
    }
}
