//! User playlists: creation, listing and membership changes.
//!
//! Every mutation checks ownership first. A playlist that does not exist
//! and one owned by someone else are reported the same way. After a
//! membership change (never after a no-op) the cover is recomputed from
//! the member songs.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sqlx::SqlitePool;

use super::likes::annotate;
use super::resolver::{ResolutionError, SongResolver};
use crate::db;
use crate::error::FailureKind;
use crate::model::{Playlist, PlaylistChoice, PlaylistId, Song, UserId};

/// Maximum playlist name length, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Errors returned by playlist operations
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    /// Precondition violation (blank id, bad name)
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Missing, or owned by someone else
    #[error("Playlist {0} not found or not owned")]
    NotFound(PlaylistId),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl PlaylistError {
    /// Machine-readable failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            PlaylistError::InvalidInput(_) => FailureKind::InvalidInput,
            PlaylistError::NotFound(_) => FailureKind::NotFound,
            PlaylistError::Resolution(e) => e.kind(),
            PlaylistError::Storage(_) => FailureKind::StorageError,
        }
    }
}

/// Per-playlist result of a membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationResult {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
    /// Bulk add only: playlist missing or foreign
    NotFoundOrNotOwned,
    /// Bulk add only: storage failure for this playlist
    Failed { kind: FailureKind },
}

impl MutationResult {
    /// Whether membership changed.
    pub fn changed(self) -> bool {
        matches!(self, MutationResult::Added | MutationResult::Removed)
    }

    /// Short human-readable message.
    pub fn message(self) -> &'static str {
        match self {
            MutationResult::Added => "Added",
            MutationResult::AlreadyPresent => "Already in playlist",
            MutationResult::Removed => "Removed",
            MutationResult::NotPresent => "Not in playlist",
            MutationResult::NotFoundOrNotOwned => "Playlist not found or not owned",
            MutationResult::Failed { .. } => "Could not update playlist",
        }
    }
}

/// What cover recomputation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cover", content = "url", rename_all = "snake_case")]
pub enum CoverChange {
    /// No membership change, nothing recomputed
    Skipped,
    /// Recomputed value equals the stored one, no write
    Unchanged,
    Set(String),
    Cleared,
}

/// Outcome of a single add or remove
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistMutation {
    pub result: MutationResult,
    /// Playlist as stored after the mutation
    pub playlist: Playlist,
    /// `None` when a remove targeted a song that was never cached
    pub song: Option<Song>,
    pub cover: CoverChange,
}

/// Owned playlist with its songs.
#[derive(Debug, Clone, Serialize)]
pub struct UserPlaylistDetail {
    pub playlist: Playlist,
    pub songs: Vec<Song>,
}

/// Pick a random non-blank cover, or `None` if no member has one.
pub fn pick_cover<R: Rng + ?Sized>(covers: &[Option<String>], rng: &mut R) -> Option<String> {
    let candidates: Vec<&String> = covers
        .iter()
        .flatten()
        .filter(|c| !c.trim().is_empty())
        .collect();
    candidates.choose(rng).map(|c| (*c).clone())
}

/// Owns playlist mutations and derived cover state.
pub struct PlaylistService {
    pool: SqlitePool,
    resolver: SongResolver,
    rng: Mutex<StdRng>,
}

impl PlaylistService {
    /// Create a service drawing covers from OS randomness.
    pub fn new(pool: SqlitePool, resolver: SongResolver) -> Self {
        Self::with_rng(pool, resolver, StdRng::from_os_rng())
    }

    /// Create a service with a fixed cover seed.
    pub fn with_seed(pool: SqlitePool, resolver: SongResolver, seed: u64) -> Self {
        Self::with_rng(pool, resolver, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool: SqlitePool, resolver: SongResolver, rng: StdRng) -> Self {
        Self {
            pool,
            resolver,
            rng: Mutex::new(rng),
        }
    }

    // ------------------------------------------------------------------------
    // Creation and listing
    // ------------------------------------------------------------------------

    /// Create an empty playlist.
    pub async fn create(&self, owner_id: UserId, name: &str) -> Result<Playlist, PlaylistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaylistError::InvalidInput("playlist name is empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(PlaylistError::InvalidInput("playlist name is too long"));
        }

        let playlist = db::create_playlist(&self.pool, owner_id, name).await?;
        tracing::info!(owner_id, playlist_id = playlist.id, name, "Created playlist");
        Ok(playlist)
    }

    /// The owner's playlists, newest first.
    pub async fn list(&self, owner_id: UserId) -> Result<Vec<Playlist>, PlaylistError> {
        Ok(db::list_playlists(&self.pool, owner_id).await?)
    }

    /// `{id, name}` pairs for the "add to playlists" picker.
    pub async fn choices(&self, owner_id: UserId) -> Result<Vec<PlaylistChoice>, PlaylistError> {
        let choices = db::playlist_choices(&self.pool, owner_id).await?;
        tracing::debug!(owner_id, count = choices.len(), "Listed playlist choices");
        Ok(choices)
    }

    /// An owned playlist with its songs, stamped with the owner's likes.
    pub async fn detail(
        &self,
        owner_id: UserId,
        playlist_id: PlaylistId,
    ) -> Result<UserPlaylistDetail, PlaylistError> {
        let playlist = self.owned(owner_id, playlist_id).await?;
        let mut songs = db::playlist_songs(&self.pool, playlist.id).await?;
        annotate(&self.pool, Some(owner_id), &mut songs).await;
        Ok(UserPlaylistDetail { playlist, songs })
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Add a track to an owned playlist, resolving the song if needed.
    pub async fn add_song(
        &self,
        owner_id: UserId,
        playlist_id: PlaylistId,
        external_id: &str,
    ) -> Result<PlaylistMutation, PlaylistError> {
        if external_id.trim().is_empty() {
            return Err(PlaylistError::InvalidInput("external id is empty"));
        }
        let playlist = self.owned(owner_id, playlist_id).await?;
        let song = self.resolver.resolve(external_id).await?;

        let result = self.insert_member(&playlist, &song).await?;
        self.finish(playlist, Some(song), result).await
    }

    /// Remove a track from an owned playlist.
    ///
    /// Only the local store is consulted for the song: a track that was
    /// never cached cannot be a member.
    pub async fn remove_song(
        &self,
        owner_id: UserId,
        playlist_id: PlaylistId,
        external_id: &str,
    ) -> Result<PlaylistMutation, PlaylistError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(PlaylistError::InvalidInput("external id is empty"));
        }
        let playlist = self.owned(owner_id, playlist_id).await?;

        let Some(song) = db::get_song_by_external_id(&self.pool, external_id).await? else {
            tracing::info!(playlist_id, external_id, "Song not cached, nothing to remove");
            return self.finish(playlist, None, MutationResult::NotPresent).await;
        };

        let result = if db::remove_playlist_song(&self.pool, playlist.id, song.id).await? {
            tracing::info!(playlist_id, external_id, title = %song.title, "Removed song from playlist");
            MutationResult::Removed
        } else {
            MutationResult::NotPresent
        };
        self.finish(playlist, Some(song), result).await
    }

    /// Add one track to several playlists.
    ///
    /// The song is resolved once. Playlists the owner does not own are
    /// reported as [`MutationResult::NotFoundOrNotOwned`] and processing
    /// continues with the rest.
    pub async fn add_song_to_many(
        &self,
        owner_id: UserId,
        external_id: &str,
        playlist_ids: &[PlaylistId],
    ) -> Result<BTreeMap<PlaylistId, MutationResult>, PlaylistError> {
        if external_id.trim().is_empty() {
            return Err(PlaylistError::InvalidInput("external id is empty"));
        }
        let mut results = BTreeMap::new();
        if playlist_ids.is_empty() {
            tracing::info!(owner_id, "No playlists selected");
            return Ok(results);
        }

        let song = self.resolver.resolve(external_id).await?;

        for &playlist_id in playlist_ids {
            if results.contains_key(&playlist_id) {
                continue;
            }
            let result = self.add_one_of_many(owner_id, playlist_id, &song).await;
            results.insert(playlist_id, result);
        }

        Ok(results)
    }

    async fn add_one_of_many(
        &self,
        owner_id: UserId,
        playlist_id: PlaylistId,
        song: &Song,
    ) -> MutationResult {
        let outcome = async {
            let Some(playlist) = db::get_owned_playlist(&self.pool, playlist_id, owner_id).await?
            else {
                tracing::warn!(owner_id, playlist_id, "Playlist not found or not owned");
                return Ok(MutationResult::NotFoundOrNotOwned);
            };
            let result = self.insert_member(&playlist, song).await?;
            if result.changed() {
                self.recompute_cover(&playlist).await?;
            }
            Ok::<_, sqlx::Error>(result)
        }
        .await;

        outcome.unwrap_or_else(|e| {
            tracing::error!(owner_id, playlist_id, error = %e, "Failed to add song to playlist");
            MutationResult::Failed {
                kind: FailureKind::StorageError,
            }
        })
    }

    async fn owned(
        &self,
        owner_id: UserId,
        playlist_id: PlaylistId,
    ) -> Result<Playlist, PlaylistError> {
        db::get_owned_playlist(&self.pool, playlist_id, owner_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(owner_id, playlist_id, "Playlist not found or not owned");
                PlaylistError::NotFound(playlist_id)
            })
    }

    async fn insert_member(
        &self,
        playlist: &Playlist,
        song: &Song,
    ) -> Result<MutationResult, sqlx::Error> {
        if db::add_playlist_song(&self.pool, playlist.id, song.id).await? {
            tracing::info!(
                playlist_id = playlist.id,
                external_id = %song.external_id,
                title = %song.title,
                "Added song to playlist"
            );
            Ok(MutationResult::Added)
        } else {
            tracing::debug!(playlist_id = playlist.id, external_id = %song.external_id, "Song already in playlist");
            Ok(MutationResult::AlreadyPresent)
        }
    }

    /// Recompute the cover after a change and return the stored playlist.
    async fn finish(
        &self,
        mut playlist: Playlist,
        song: Option<Song>,
        result: MutationResult,
    ) -> Result<PlaylistMutation, PlaylistError> {
        let cover = if result.changed() {
            self.recompute_cover(&playlist).await?
        } else {
            CoverChange::Skipped
        };

        match &cover {
            CoverChange::Set(url) => playlist.cover_image_url = Some(url.clone()),
            CoverChange::Cleared => playlist.cover_image_url = None,
            CoverChange::Skipped | CoverChange::Unchanged => {}
        }

        Ok(PlaylistMutation {
            result,
            playlist,
            song,
            cover,
        })
    }

    /// Derive the cover from current membership, writing only on change.
    pub async fn recompute_cover(&self, playlist: &Playlist) -> Result<CoverChange, sqlx::Error> {
        let covers = db::playlist_song_covers(&self.pool, playlist.id).await?;
        let next = {
            let mut rng = self.rng.lock();
            pick_cover(&covers, &mut *rng)
        };

        if next == playlist.cover_image_url {
            return Ok(CoverChange::Unchanged);
        }

        db::set_playlist_cover(&self.pool, playlist.id, next.as_deref()).await?;
        tracing::debug!(playlist_id = playlist.id, cover = ?next, songs = covers.len(), "Updated playlist cover");

        Ok(match next {
            Some(url) => CoverChange::Set(url),
            None => CoverChange::Cleared,
        })
    }
}
