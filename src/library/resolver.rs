//! Song resolution: catalog id in, cached local [`Song`] out.
//!
//! A cache hit returns the stored row as-is. Cached songs are never
//! refreshed. A miss fetches the track once, validates it and inserts it.
//! Two resolvers racing on the same id both succeed with the same row: the
//! unique constraint on `songs.external_id` decides the winner and the loser
//! re-reads.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::dto::{self, RawNumber};
use crate::catalog::{CatalogApi, CatalogError};
use crate::db;
use crate::error::FailureKind;
use crate::model::{NewSong, Song, clamp_url};

/// Why a song could not be resolved
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Blank external id
    #[error("External id is empty")]
    InvalidInput,

    /// Catalog says the track does not exist
    #[error("Track {0} not found in catalog")]
    NotFound(String),

    /// Catalog call failed for another reason
    #[error("Catalog lookup for track {id} failed: {source}")]
    UpstreamFailure {
        id: String,
        #[source]
        source: CatalogError,
    },

    /// Track payload lacks a required field
    #[error("Track {id} has no {field}")]
    IncompleteData { id: String, field: &'static str },

    /// Local store failure
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ResolutionError {
    /// Machine-readable failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            ResolutionError::InvalidInput => FailureKind::InvalidInput,
            ResolutionError::NotFound(_) => FailureKind::NotFound,
            ResolutionError::UpstreamFailure { source, .. } => source.kind(),
            ResolutionError::IncompleteData { .. } => FailureKind::IncompleteData,
            ResolutionError::Storage(_) => FailureKind::StorageError,
        }
    }
}

/// Get-or-fetch-or-create for cached songs.
#[derive(Clone)]
pub struct SongResolver {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogApi>,
}

impl SongResolver {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn CatalogApi>) -> Self {
        Self { pool, catalog }
    }

    /// Resolve a catalog track id to its cached song.
    pub async fn resolve(&self, external_id: &str) -> Result<Song, ResolutionError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(ResolutionError::InvalidInput);
        }

        if let Some(song) = db::get_song_by_external_id(&self.pool, external_id).await? {
            tracing::debug!(external_id, song_id = song.id, "Song cache hit");
            return Ok(song);
        }

        tracing::info!(external_id, "Song cache miss, fetching from catalog");
        let raw = self
            .catalog
            .fetch_track(external_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    tracing::warn!(external_id, "Track not found in catalog");
                    ResolutionError::NotFound(external_id.to_string())
                } else {
                    tracing::error!(external_id, error = %e, "Track lookup failed");
                    ResolutionError::UpstreamFailure {
                        id: external_id.to_string(),
                        source: e,
                    }
                }
            })?;

        let new_song = new_song_from_track(external_id, &raw).inspect_err(|e| {
            tracing::warn!(external_id, error = %e, "Track payload incomplete, not caching");
        })?;

        self.insert_or_reread(&new_song).await
    }

    async fn insert_or_reread(&self, new_song: &NewSong) -> Result<Song, ResolutionError> {
        match db::insert_song(&self.pool, new_song).await {
            Ok(song) => {
                tracing::info!(
                    external_id = %song.external_id,
                    song_id = song.id,
                    title = %song.title,
                    "Cached new song"
                );
                Ok(song)
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(
                    external_id = %new_song.external_id,
                    "Song cached by a concurrent resolver, re-reading"
                );
                db::get_song_by_external_id(&self.pool, &new_song.external_id)
                    .await?
                    .ok_or(ResolutionError::Storage(sqlx::Error::RowNotFound))
            }
            Err(e) => {
                tracing::error!(external_id = %new_song.external_id, error = %e, "Failed to cache song");
                Err(e.into())
            }
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate a track payload and turn it into a cacheable row.
fn new_song_from_track(external_id: &str, raw: &dto::Track) -> Result<NewSong, ResolutionError> {
    let title = non_blank(raw.title_short.as_deref())
        .or_else(|| non_blank(raw.title.as_deref()))
        .ok_or_else(|| ResolutionError::IncompleteData {
            id: external_id.to_string(),
            field: "title",
        })?;

    let artist_name = non_blank(raw.artist.as_ref().and_then(|a| a.name.as_deref())).ok_or_else(
        || ResolutionError::IncompleteData {
            id: external_id.to_string(),
            field: "artist name",
        },
    )?;

    let album_cover = raw.album.as_ref().and_then(|a| a.cover_medium.as_deref());

    Ok(NewSong {
        external_id: external_id.to_string(),
        title: title.to_string(),
        artist_name: artist_name.to_string(),
        album_cover_url: clamp_url(album_cover),
        preview_url: clamp_url(raw.preview.as_deref()),
        duration_seconds: raw
            .duration
            .as_ref()
            .and_then(RawNumber::as_i64)
            .filter(|d| *d >= 0),
    })
}
