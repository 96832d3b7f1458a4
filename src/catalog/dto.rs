//! Deezer API Data Transfer Objects
//!
//! These types mirror what the Deezer public API returns. Every field is
//! optional because the API omits fields freely depending on the endpoint
//! (chart entries, search hits and embedded playlist tracks all carry
//! different subsets). Required-field checks happen in the adapter, never here.
//!
//! DO NOT use these types outside the catalog module - convert them with
//! [`super::adapter`] first.
//!
//! API Reference: https://developers.deezer.com/api

use serde::{Deserialize, Serialize};

/// Identifier as sent by the API (usually a number, occasionally a string).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    /// Canonical string form, or `None` for the `0` / blank "no id" values.
    pub fn key(&self) -> Option<String> {
        match self {
            RawId::Number(0) => None,
            RawId::Number(n) => Some(n.to_string()),
            RawId::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }
}

/// A numeric field the API does not always send as a number.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawNumber {
    /// Integer value, truncating floats and parsing numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            RawNumber::Float(_) => None,
            RawNumber::Text(s) => s.trim().parse().ok(),
            RawNumber::Other(_) => None,
        }
    }
}

/// Track object (chart entry, search hit, artist top track, playlist entry
/// or `/track/{id}` lookup)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Track {
    pub id: Option<RawId>,
    pub title: Option<String>,
    /// Title without version suffixes ("(Remastered)" etc.)
    pub title_short: Option<String>,
    /// Duration in seconds
    pub duration: Option<RawNumber>,
    /// Popularity rank
    pub rank: Option<RawNumber>,
    /// 30 second MP3 preview URL
    pub preview: Option<String>,
    pub artist: Option<ArtistRef>,
    pub album: Option<AlbumRef>,
}

/// Artist as embedded in a track or album
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtistRef {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub picture_medium: Option<String>,
}

/// Album as embedded in a track
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AlbumRef {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub cover_medium: Option<String>,
}

/// Artist object (chart entry, search hit or `/artist/{id}` lookup)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Artist {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub picture_small: Option<String>,
    pub picture_medium: Option<String>,
    pub picture_big: Option<String>,
    pub picture_xl: Option<String>,
    pub nb_album: Option<RawNumber>,
    pub nb_fan: Option<RawNumber>,
    pub link: Option<String>,
}

/// Album object (search hit or editorial release)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Album {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub cover_medium: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<String>,
    pub artist: Option<ArtistRef>,
}

/// User reference on playlists
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserRef {
    pub id: Option<RawId>,
    pub name: Option<String>,
}

/// Playlist chart entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Playlist {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub picture_medium: Option<String>,
    pub link: Option<String>,
    pub user: Option<UserRef>,
}

/// `/playlist/{id}` lookup
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistDetail {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Total duration in seconds
    pub duration: Option<RawNumber>,
    pub nb_tracks: Option<RawNumber>,
    pub fans: Option<RawNumber>,
    pub link: Option<String>,
    pub picture_small: Option<String>,
    pub picture_medium: Option<String>,
    pub picture_big: Option<String>,
    pub picture_xl: Option<String>,
    pub creator: Option<UserRef>,
    /// Embedded tracks; kept raw so one bad entry can't sink the playlist
    pub tracks: Option<TrackPage>,
}

/// Embedded `{ "data": [...] }` list of tracks
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackPage {
    pub data: Vec<serde_json::Value>,
}

/// One item of a `/search` response, discriminated by its `type` field
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Track(Track),
    Artist(Artist),
    Album(Album),
    /// Playlists, radios, users... not surfaced
    #[serde(other)]
    Other,
}

/// Error payload: `{"error": {"type": ..., "message": ..., "code": ...}}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub code: Option<i64>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs accept what the real API returns.
// ============================================================================
