//! Persisted entities of the local store.
//!
//! Defines [`Song`], [`UserProfile`] and [`Playlist`]. These are derived from
//! SQLx for database mapping.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `songs` - Cached catalog tracks, unique by `external_id`
//! - `user_profiles` - One row per user identity
//! - `playlists` - User-owned playlists with a derived cover
//! - `profile_liked_songs`, `playlist_songs` - Membership sets

use serde::Serialize;
use sqlx::FromRow;

use crate::catalog::adapter::format_seconds;

/// Opaque user identity issued by the authentication layer.
pub type UserId = i64;

/// Database ID of a playlist.
pub type PlaylistId = i64;

/// Maximum stored length of URL columns.
pub const MAX_URL_LEN: usize = 500;

/// A catalog track cached in the local store.
///
/// Created lazily on first resolution and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Song {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Catalog track ID (unique)
    pub external_id: String,
    /// Track title (short title preferred)
    pub title: String,
    /// Main artist name
    pub artist_name: String,
    /// Medium album cover
    pub album_cover_url: Option<String>,
    /// 30 second preview clip
    pub preview_url: Option<String>,
    /// Duration in seconds
    #[sqlx(rename = "duration")]
    pub duration_seconds: Option<i64>,
    /// Viewer-specific liked flag, set by annotation only
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

impl Song {
    /// Duration in `M:SS` format.
    pub fn duration_formatted(&self) -> String {
        format_seconds(self.duration_seconds)
    }
}

/// Fields needed to cache a new song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub external_id: String,
    pub title: String,
    pub artist_name: String,
    pub album_cover_url: Option<String>,
    pub preview_url: Option<String>,
    pub duration_seconds: Option<i64>,
}

/// Per-user profile holding the liked songs set.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserProfile {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Owning user identity (unique)
    pub user_id: UserId,
}

/// A user-created playlist.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Playlist {
    /// Database ID (auto-generated)
    pub id: PlaylistId,
    /// Display name
    pub name: String,
    /// Owning user identity
    pub owner_id: UserId,
    /// Cover picked from the member songs; never set directly
    pub cover_image_url: Option<String>,
}

/// Minimal playlist view for "add to playlist" pickers.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct PlaylistChoice {
    pub id: PlaylistId,
    pub name: String,
}

/// Truncate a URL to the storage limit, mapping blank values to `None`.
pub fn clamp_url(url: Option<&str>) -> Option<String> {
    let url = url?;
    if url.is_empty() {
        return None;
    }
    Some(url.chars().take(MAX_URL_LEN).collect())
}
