//! Music service - the entry point for the view layer.
//!
//! Wires the catalog, the local store and the library services together
//! and exposes one method per user-facing operation:
//! 1. Charts, releases and detail pages (degrade to empty / `None` on failure)
//! 2. Search, plain and with artist prioritization
//! 3. Song resolution, likes and liked-status annotation
//! 4. User playlists and their membership

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::adapter::{
    normalize_album_release, normalize_artist, normalize_playlist_summary, normalize_track,
    to_artist_detail, to_playlist_detail,
};
use crate::catalog::{
    AlbumRelease, Artist, ArtistDetail, CatalogApi, CatalogClient, CatalogError, PlaylistDetail,
    PlaylistSummary, SearchLimits, SearchResults, Track,
};
use crate::config::{Config, LimitsConfig};
use crate::db;
use crate::error::{Error, Result, ResultExt};
use crate::library::{
    LikeError, LikeOutcome, Likeable, MutationResult, PlaylistError, PlaylistMutation,
    PlaylistService, ResolutionError, SongResolver, UserPlaylistDetail, likes,
};
use crate::model::{Playlist, PlaylistChoice, PlaylistId, Song, UserId};
use crate::search::{SearchAggregator, SearchFailure};

/// High-level music operations over one catalog and one store
pub struct MusicService {
    pool: SqlitePool,
    catalog: Arc<dyn CatalogApi>,
    limits: LimitsConfig,
    resolver: SongResolver,
    playlists: PlaylistService,
    search: SearchAggregator,
}

impl MusicService {
    /// Create a service over an existing pool and catalog
    pub fn new(pool: SqlitePool, catalog: Arc<dyn CatalogApi>, limits: LimitsConfig) -> Self {
        let resolver = SongResolver::new(pool.clone(), catalog.clone());
        Self {
            playlists: PlaylistService::new(pool.clone(), resolver.clone()),
            search: SearchAggregator::new(catalog.clone()),
            pool,
            catalog,
            limits,
            resolver,
        }
    }

    /// Open the configured database and build the HTTP catalog client
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = db::init_db(&db::db_url(Some(&config.database.path)))
            .await
            .with_context("opening database")?;
        let client = CatalogClient::new(&config.catalog)?;
        Ok(Self::new(pool, Arc::new(client), config.limits.clone()))
    }

    /// Use a fixed seed for playlist cover selection
    pub fn with_cover_seed(mut self, seed: u64) -> Self {
        self.playlists = PlaylistService::with_seed(self.pool.clone(), self.resolver.clone(), seed);
        self
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ------------------------------------------------------------------------
    // Charts and detail pages
    // ------------------------------------------------------------------------

    /// Artists chart, deduplicated by id
    pub async fn top_artists(&self, limit: usize) -> Vec<Artist> {
        let raw = degrade("top_artists", self.catalog.top_artists(limit).await);
        let mut seen = HashSet::new();
        raw.iter()
            .filter_map(normalize_artist)
            .filter(|a| seen.insert(a.id.clone()))
            .take(limit)
            .collect()
    }

    /// Tracks chart
    pub async fn top_tracks(&self, limit: usize) -> Vec<Track> {
        let raw = degrade("top_tracks", self.catalog.top_tracks(limit).await);
        raw.iter().filter_map(normalize_track).take(limit).collect()
    }

    /// Editorial playlists chart
    pub async fn top_playlists(&self, limit: usize) -> Vec<PlaylistSummary> {
        let raw = degrade("top_playlists", self.catalog.top_playlists(limit).await);
        raw.iter()
            .filter_map(normalize_playlist_summary)
            .take(limit)
            .collect()
    }

    /// Editorial new releases
    pub async fn new_releases(&self, limit: usize) -> Vec<AlbumRelease> {
        let raw = degrade("new_releases", self.catalog.new_releases(limit).await);
        raw.iter()
            .filter_map(|album| {
                let release = normalize_album_release(album);
                if release.is_none() {
                    tracing::warn!(id = ?album.id, "Dropping release without id or title");
                }
                release
            })
            .take(limit)
            .collect()
    }

    /// Artist profile with top tracks, or `None` if the artist can't be loaded
    ///
    /// A failed top-tracks lookup yields an empty list, not a missing page.
    pub async fn artist_detail(&self, artist_id: &str) -> Option<ArtistDetail> {
        let artist_id = artist_id.trim();
        if artist_id.is_empty() {
            return None;
        }

        let raw = match self.catalog.fetch_artist(artist_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(artist_id, error = %e, "Artist lookup failed");
                return None;
            }
        };

        let top_tracks = match self
            .catalog
            .artist_top_tracks(artist_id, self.limits.artist_top_tracks)
            .await
        {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!(artist_id, error = %e, "Artist top tracks lookup failed");
                Vec::new()
            }
        };

        to_artist_detail(&raw, &top_tracks)
    }

    /// Catalog playlist with its tracks, or `None` if it can't be loaded
    pub async fn playlist_detail(&self, playlist_id: &str) -> Option<PlaylistDetail> {
        let playlist_id = playlist_id.trim();
        if playlist_id.is_empty() {
            return None;
        }

        match self.catalog.fetch_playlist(playlist_id).await {
            Ok(raw) => to_playlist_detail(&raw),
            Err(e) => {
                tracing::error!(playlist_id, error = %e, "Playlist lookup failed");
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Search tracks, artists and albums
    pub async fn search_catalog(
        &self,
        query: &str,
        limits: &SearchLimits,
    ) -> std::result::Result<SearchResults, SearchFailure> {
        self.search.search(query, limits).await
    }

    /// Search with the top track's artist listed first, using the
    /// configured interactive limits
    pub async fn interactive_search(
        &self,
        query: &str,
    ) -> std::result::Result<SearchResults, SearchFailure> {
        self.search
            .interactive_search(query, &self.limits.interactive_search())
            .await
    }

    // ------------------------------------------------------------------------
    // Songs and likes
    // ------------------------------------------------------------------------

    /// Resolve a catalog track id to its cached song
    pub async fn resolve_song(
        &self,
        external_id: &str,
    ) -> std::result::Result<Song, ResolutionError> {
        self.resolver.resolve(external_id).await
    }

    /// Stamp the viewer's liked flags on any records
    pub async fn annotate_liked<R: Likeable>(&self, viewer: Option<UserId>, records: &mut [R]) {
        likes::annotate(&self.pool, viewer, records).await;
    }

    /// Flip the viewer's like on a track
    pub async fn toggle_like(
        &self,
        user_id: UserId,
        external_id: &str,
    ) -> std::result::Result<LikeOutcome, LikeError> {
        likes::toggle_like(&self.pool, &self.resolver, user_id, external_id).await
    }

    /// The viewer's liked songs, ordered by title
    pub async fn liked_songs(&self, user_id: UserId) -> Result<Vec<Song>> {
        Ok(likes::liked_songs(&self.pool, user_id).await?)
    }

    /// Re-fetch a track's preview URL, bypassing the song cache
    ///
    /// Returns `None` when the catalog has no preview for the track.
    pub async fn fresh_preview(&self, external_id: &str) -> Result<Option<String>> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(Error::InvalidInput("external id is empty"));
        }

        let raw = self
            .catalog
            .fetch_track(external_id)
            .await
            .inspect_err(|e: &CatalogError| {
                tracing::error!(external_id, error = %e, "Preview lookup failed");
            })?;

        let preview = raw
            .preview
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if preview.is_none() {
            tracing::info!(external_id, "Track has no preview");
        }
        Ok(preview)
    }

    // ------------------------------------------------------------------------
    // User playlists
    // ------------------------------------------------------------------------

    pub async fn create_playlist(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> std::result::Result<Playlist, PlaylistError> {
        self.playlists.create(owner_id, name).await
    }

    /// The owner's playlists, newest first
    pub async fn list_playlists(
        &self,
        owner_id: UserId,
    ) -> std::result::Result<Vec<Playlist>, PlaylistError> {
        self.playlists.list(owner_id).await
    }

    /// `{id, name}` pairs ordered by name
    pub async fn playlist_choices(
        &self,
        owner_id: UserId,
    ) -> std::result::Result<Vec<PlaylistChoice>, PlaylistError> {
        self.playlists.choices(owner_id).await
    }

    pub async fn user_playlist_detail(
        &self,
        owner_id: UserId,
        playlist_id: PlaylistId,
    ) -> std::result::Result<UserPlaylistDetail, PlaylistError> {
        self.playlists.detail(owner_id, playlist_id).await
    }

    pub async fn add_song_to_playlist(
        &self,
        playlist_id: PlaylistId,
        owner_id: UserId,
        external_id: &str,
    ) -> std::result::Result<PlaylistMutation, PlaylistError> {
        self.playlists
            .add_song(owner_id, playlist_id, external_id)
            .await
    }

    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: PlaylistId,
        owner_id: UserId,
        external_id: &str,
    ) -> std::result::Result<PlaylistMutation, PlaylistError> {
        self.playlists
            .remove_song(owner_id, playlist_id, external_id)
            .await
    }

    pub async fn add_song_to_playlists(
        &self,
        owner_id: UserId,
        external_id: &str,
        playlist_ids: &[PlaylistId],
    ) -> std::result::Result<BTreeMap<PlaylistId, MutationResult>, PlaylistError> {
        self.playlists
            .add_song_to_many(owner_id, external_id, playlist_ids)
            .await
    }
}

/// Listing calls degrade to an empty list on failure
fn degrade<T>(operation: &str, result: std::result::Result<Vec<T>, CatalogError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(operation, error = %e, kind = %e.kind(), "Catalog listing failed");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::dto::{self, RawId};
    use crate::catalog::traits::mocks::{MockCatalog, album_payload, artist_payload, track_payload};
    use crate::error::FailureKind;
    use crate::library::TrackRecord;
    use crate::test_utils::temp_db;

    fn service(pool: &SqlitePool, mock: MockCatalog) -> MusicService {
        MusicService::new(pool.clone(), Arc::new(mock), LimitsConfig::default()).with_cover_seed(11)
    }

    #[tokio::test]
    async fn test_listings_degrade_to_empty() {
        let (pool, _dir) = temp_db().await;
        let svc = service(
            &pool,
            MockCatalog::with_error(CatalogError::Network("timeout".to_string())),
        );

        assert!(svc.top_artists(10).await.is_empty());
        assert!(svc.top_tracks(10).await.is_empty());
        assert!(svc.top_playlists(8).await.is_empty());
        assert!(svc.new_releases(24).await.is_empty());
        assert!(svc.artist_detail("27").await.is_none());
        assert!(svc.playlist_detail("908622995").await.is_none());
    }

    #[tokio::test]
    async fn test_top_artists_deduplicated() {
        let (pool, _dir) = temp_db().await;
        let svc = service(
            &pool,
            MockCatalog::new().chart_artists(vec![
                artist_payload(1, "One"),
                artist_payload(1, "One again"),
                artist_payload(2, "Two"),
                dto::Artist::default(),
            ]),
        );

        let ids: Vec<_> = svc.top_artists(10).await.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_top_playlists_and_releases_fallbacks() {
        let (pool, _dir) = temp_db().await;
        let mut various = album_payload(7, "Hits", 0, "");
        various.artist = None;
        let svc = service(
            &pool,
            MockCatalog::new()
                .chart_playlists(vec![dto::Playlist {
                    id: Some(RawId::Number(3)),
                    title: Some("Top France".to_string()),
                    user: Some(dto::UserRef {
                        id: Some(RawId::Number(9)),
                        name: Some("Deezer Charts".to_string()),
                    }),
                    ..Default::default()
                }])
                .releases(vec![various, dto::Album::default()]),
        );

        let playlists = svc.top_playlists(8).await;
        assert_eq!(playlists[0].subtitle, "By Deezer Charts");

        let releases = svc.new_releases(24).await;
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].artist_name, "Various Artists");
    }

    #[tokio::test]
    async fn test_artist_detail_survives_top_tracks_failure() {
        let (pool, _dir) = temp_db().await;
        let svc = service(&pool, MockCatalog::new().artist(artist_payload(27, "Daft Punk")));

        let detail = svc.artist_detail("27").await.unwrap();
        assert_eq!(detail.name, "Daft Punk");
        assert!(detail.top_tracks.is_empty());
    }

    #[tokio::test]
    async fn test_artist_detail_top_tracks_take_artist_name() {
        let (pool, _dir) = temp_db().await;
        let svc = service(
            &pool,
            MockCatalog::new()
                .artist(artist_payload(27, "Daft Punk"))
                .artist_top_tracks("27", vec![track_payload(1, "Aerodynamic", 99, "Someone", None)]),
        );

        let detail = svc.artist_detail("27").await.unwrap();
        assert_eq!(detail.top_tracks.len(), 1);
        assert_eq!(detail.top_tracks[0].artist_name, "Daft Punk");
    }

    #[tokio::test]
    async fn test_fresh_preview_bypasses_cache() {
        let (pool, _dir) = temp_db().await;
        let mut payload = track_payload(1, "One", 2, "A", None);
        payload.preview = Some("  https://cdn.example/fresh.mp3 ".to_string());
        let mock = Arc::new(MockCatalog::new().track(payload));
        let svc = MusicService::new(pool.clone(), mock.clone(), LimitsConfig::default());

        svc.resolve_song("1").await.unwrap();
        let preview = svc.fresh_preview("1").await.unwrap();
        assert_eq!(preview.as_deref(), Some("https://cdn.example/fresh.mp3"));
        assert_eq!(mock.calls("fetch_track"), 2);
    }

    #[tokio::test]
    async fn test_fresh_preview_missing_and_errors() {
        let (pool, _dir) = temp_db().await;
        let mut payload = track_payload(1, "One", 2, "A", None);
        payload.preview = Some(String::new());
        let svc = service(&pool, MockCatalog::new().track(payload));

        assert_eq!(svc.fresh_preview("1").await.unwrap(), None);
        let err = svc.fresh_preview("404").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::CatalogError);
        let err = svc.fresh_preview(" ").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_search_then_annotate_end_to_end() {
        let (pool, _dir) = temp_db().await;
        let svc = service(
            &pool,
            MockCatalog::new()
                .track(track_payload(1, "Liked", 2, "A", Some("https://c/1.jpg")))
                .search_hits(vec![
                    dto::SearchHit::Track(track_payload(1, "Liked", 2, "A", None)),
                    dto::SearchHit::Track(track_payload(2, "Not Liked", 2, "A", None)),
                ]),
        );

        svc.toggle_like(5, "1").await.unwrap();
        let mut results = svc
            .search_catalog("liked", &svc.limits().search())
            .await
            .unwrap();
        svc.annotate_liked(Some(5), &mut results.tracks).await;

        let flags: Vec<_> = results.tracks.iter().map(|t| t.is_liked).collect();
        assert_eq!(flags, vec![Some(true), Some(false)]);

        let mut mixed = vec![
            TrackRecord::Catalog(results.tracks[1].clone()),
            TrackRecord::Cached(svc.liked_songs(5).await.unwrap().remove(0)),
        ];
        svc.annotate_liked(None, &mut mixed).await;
        assert!(mixed.iter().all(|r| r.is_liked() == Some(false)));
    }

    #[tokio::test]
    async fn test_playlist_flow() {
        let (pool, _dir) = temp_db().await;
        let svc = service(
            &pool,
            MockCatalog::new().track(track_payload(1, "One", 2, "A", Some("https://c/1.jpg"))),
        );

        let playlist = svc.create_playlist(3, "Mine").await.unwrap();
        let added = svc.add_song_to_playlist(playlist.id, 3, "1").await.unwrap();
        assert_eq!(added.result, MutationResult::Added);

        let results = svc
            .add_song_to_playlists(3, "1", &[playlist.id])
            .await
            .unwrap();
        assert_eq!(results[&playlist.id], MutationResult::AlreadyPresent);

        let detail = svc.user_playlist_detail(3, playlist.id).await.unwrap();
        assert_eq!(detail.playlist.cover_image_url.as_deref(), Some("https://c/1.jpg"));

        let removed = svc
            .remove_song_from_playlist(playlist.id, 3, "1")
            .await
            .unwrap();
        assert_eq!(removed.result, MutationResult::Removed);
        assert_eq!(removed.playlist.cover_image_url, None);

        let err = svc.add_song_to_playlist(playlist.id, 4, "1").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert_eq!(svc.list_playlists(3).await.unwrap().len(), 1);
        assert_eq!(svc.playlist_choices(4).await.unwrap().len(), 0);
    }
}
