//! Liked songs: per-viewer annotation and the like toggle.

use serde::Serialize;
use sqlx::SqlitePool;

use super::resolver::{ResolutionError, SongResolver};
use crate::catalog;
use crate::db;
use crate::error::FailureKind;
use crate::model::{Song, UserId};

/// A record that can carry a viewer-specific liked flag.
pub trait Likeable {
    /// Catalog track id, if the record has one.
    fn external_id(&self) -> Option<&str>;

    fn set_liked(&mut self, liked: bool);
}

impl Likeable for catalog::Track {
    fn external_id(&self) -> Option<&str> {
        Some(self.id.as_str()).filter(|id| !id.is_empty())
    }

    fn set_liked(&mut self, liked: bool) {
        self.is_liked = Some(liked);
    }
}

impl Likeable for Song {
    fn external_id(&self) -> Option<&str> {
        Some(self.external_id.as_str()).filter(|id| !id.is_empty())
    }

    fn set_liked(&mut self, liked: bool) {
        self.is_liked = Some(liked);
    }
}

/// Catalog tracks and cached songs mixed in one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrackRecord {
    Catalog(catalog::Track),
    Cached(Song),
}

impl TrackRecord {
    pub fn is_liked(&self) -> Option<bool> {
        match self {
            TrackRecord::Catalog(t) => t.is_liked,
            TrackRecord::Cached(s) => s.is_liked,
        }
    }
}

impl Likeable for TrackRecord {
    fn external_id(&self) -> Option<&str> {
        match self {
            TrackRecord::Catalog(t) => t.external_id(),
            TrackRecord::Cached(s) => s.external_id(),
        }
    }

    fn set_liked(&mut self, liked: bool) {
        match self {
            TrackRecord::Catalog(t) => t.set_liked(liked),
            TrackRecord::Cached(s) => s.set_liked(liked),
        }
    }
}

/// Stamp `is_liked` on every record for `viewer`.
///
/// Anonymous viewers and empty inputs are stamped `false` without touching
/// the store. Never fails: a storage error is logged and every record is
/// stamped `false`.
pub async fn annotate<R: Likeable>(pool: &SqlitePool, viewer: Option<UserId>, records: &mut [R]) {
    let Some(user_id) = viewer.filter(|_| !records.is_empty()) else {
        records.iter_mut().for_each(|r| r.set_liked(false));
        return;
    };

    let liked = match db::ensure_profile(pool, user_id).await {
        Ok(profile) => db::liked_external_ids(pool, profile.id).await,
        Err(e) => Err(e),
    };
    let liked = match liked {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(user_id, error = %e, "Failed to load liked songs, marking all unliked");
            records.iter_mut().for_each(|r| r.set_liked(false));
            return;
        }
    };

    for (index, record) in records.iter_mut().enumerate() {
        let is_liked = match record.external_id() {
            Some(id) => liked.contains(id),
            None => {
                tracing::warn!(user_id, index, "Record has no track id, marking unliked");
                false
            }
        };
        record.set_liked(is_liked);
    }
}

/// What a like toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeAction::Liked => "liked",
            LikeAction::Unliked => "unliked",
        }
    }
}

/// Result of [`toggle_like`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    /// State after the toggle
    pub liked: bool,
    pub action: LikeAction,
    /// Catalog track id
    pub song_id: String,
    pub title: String,
}

/// Errors returned by the like toggle
#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("External id is empty")]
    InvalidInput,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl LikeError {
    /// Machine-readable failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            LikeError::InvalidInput => FailureKind::InvalidInput,
            LikeError::Resolution(e) => e.kind(),
            LikeError::Storage(_) => FailureKind::StorageError,
        }
    }
}

/// Flip the viewer's like on a track, resolving the song if needed.
///
/// There is no separate like/unlike request: calling this twice
/// returns the song to its original state.
pub async fn toggle_like(
    pool: &SqlitePool,
    resolver: &SongResolver,
    user_id: UserId,
    external_id: &str,
) -> Result<LikeOutcome, LikeError> {
    if external_id.trim().is_empty() {
        return Err(LikeError::InvalidInput);
    }

    let song = resolver.resolve(external_id).await?;
    let profile = db::ensure_profile(pool, user_id).await?;

    let action = if db::is_liked(pool, profile.id, song.id).await? {
        db::remove_like(pool, profile.id, song.id).await?;
        LikeAction::Unliked
    } else {
        db::add_like(pool, profile.id, song.id).await?;
        LikeAction::Liked
    };

    tracing::info!(
        user_id,
        external_id = %song.external_id,
        title = %song.title,
        action = action.as_str(),
        "Toggled like"
    );

    Ok(LikeOutcome {
        liked: action == LikeAction::Liked,
        action,
        song_id: song.external_id,
        title: song.title,
    })
}

/// The viewer's liked songs, ordered by title and stamped liked.
pub async fn liked_songs(pool: &SqlitePool, user_id: UserId) -> Result<Vec<Song>, sqlx::Error> {
    let profile = db::ensure_profile(pool, user_id).await?;
    let mut songs = db::liked_songs(pool, profile.id).await?;
    songs.iter_mut().for_each(|s| s.set_liked(true));
    Ok(songs)
}
