//! Trait definition for the catalog client.
//!
//! This trait enables dependency injection and mocking for tests.
//! Production code uses [`CatalogClient`], while tests substitute
//! [`mocks::MockCatalog`], which records every call it receives.

use async_trait::async_trait;

use super::client::CatalogClient;
use super::domain::{CatalogError, SearchLimits};
use super::dto;

/// Read-only access to the music catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Look up a single track.
    async fn fetch_track(&self, id: &str) -> Result<dto::Track, CatalogError>;

    /// Artists chart.
    async fn top_artists(&self, limit: usize) -> Result<Vec<dto::Artist>, CatalogError>;

    /// Tracks chart.
    async fn top_tracks(&self, limit: usize) -> Result<Vec<dto::Track>, CatalogError>;

    /// Playlists chart.
    async fn top_playlists(&self, limit: usize) -> Result<Vec<dto::Playlist>, CatalogError>;

    /// Look up an artist profile.
    async fn fetch_artist(&self, id: &str) -> Result<dto::Artist, CatalogError>;

    /// An artist's most popular tracks.
    async fn artist_top_tracks(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<dto::Track>, CatalogError>;

    /// Look up an editorial playlist.
    async fn fetch_playlist(&self, id: &str) -> Result<dto::PlaylistDetail, CatalogError>;

    /// Editorial new releases.
    async fn new_releases(&self, limit: usize) -> Result<Vec<dto::Album>, CatalogError>;

    /// Mixed search across tracks, artists and albums.
    async fn search(
        &self,
        query: &str,
        limits: &SearchLimits,
    ) -> Result<Vec<dto::SearchHit>, CatalogError>;
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_track(&self, id: &str) -> Result<dto::Track, CatalogError> {
        self.fetch_track(id).await
    }

    async fn top_artists(&self, limit: usize) -> Result<Vec<dto::Artist>, CatalogError> {
        self.top_artists(limit).await
    }

    async fn top_tracks(&self, limit: usize) -> Result<Vec<dto::Track>, CatalogError> {
        self.top_tracks(limit).await
    }

    async fn top_playlists(&self, limit: usize) -> Result<Vec<dto::Playlist>, CatalogError> {
        self.top_playlists(limit).await
    }

    async fn fetch_artist(&self, id: &str) -> Result<dto::Artist, CatalogError> {
        self.fetch_artist(id).await
    }

    async fn artist_top_tracks(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<dto::Track>, CatalogError> {
        self.artist_top_tracks(id, limit).await
    }

    async fn fetch_playlist(&self, id: &str) -> Result<dto::PlaylistDetail, CatalogError> {
        self.fetch_playlist(id).await
    }

    async fn new_releases(&self, limit: usize) -> Result<Vec<dto::Album>, CatalogError> {
        self.new_releases(limit).await
    }

    async fn search(
        &self,
        query: &str,
        limits: &SearchLimits,
    ) -> Result<Vec<dto::SearchHit>, CatalogError> {
        self.search(query, limits).await
    }
}

/// Mock catalog for testing.
///
/// Returns configurable responses and counts calls per operation.
#[cfg(test)]
pub mod mocks {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;
    use crate::catalog::dto::{RawId, RawNumber};

    /// Mock catalog that serves predefined payloads.
    #[derive(Default)]
    pub struct MockCatalog {
        tracks: HashMap<String, dto::Track>,
        artists: HashMap<String, dto::Artist>,
        artist_top: HashMap<String, Vec<dto::Track>>,
        playlists: HashMap<String, dto::PlaylistDetail>,
        chart_tracks: Vec<dto::Track>,
        chart_artists: Vec<dto::Artist>,
        chart_playlists: Vec<dto::Playlist>,
        releases: Vec<dto::Album>,
        search_hits: Vec<dto::SearchHit>,
        /// Error returned by every call (takes precedence)
        error: Option<CatalogError>,
        calls: Mutex<Vec<String>>,
        last_search_fetch_limit: Mutex<Option<usize>>,
    }

    impl MockCatalog {
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock where every call fails with `error`.
        pub fn with_error(error: CatalogError) -> Self {
            Self {
                error: Some(error),
                ..Default::default()
            }
        }

        pub fn track(mut self, track: dto::Track) -> Self {
            let id = track.id.as_ref().and_then(RawId::key).unwrap_or_default();
            self.tracks.insert(id, track);
            self
        }

        pub fn artist(mut self, artist: dto::Artist) -> Self {
            let id = artist.id.as_ref().and_then(RawId::key).unwrap_or_default();
            self.artists.insert(id, artist);
            self
        }

        pub fn artist_top_tracks(mut self, artist_id: &str, tracks: Vec<dto::Track>) -> Self {
            self.artist_top.insert(artist_id.to_string(), tracks);
            self
        }

        pub fn playlist(mut self, playlist: dto::PlaylistDetail) -> Self {
            let id = playlist.id.as_ref().and_then(RawId::key).unwrap_or_default();
            self.playlists.insert(id, playlist);
            self
        }

        pub fn chart_tracks(mut self, tracks: Vec<dto::Track>) -> Self {
            self.chart_tracks = tracks;
            self
        }

        pub fn chart_artists(mut self, artists: Vec<dto::Artist>) -> Self {
            self.chart_artists = artists;
            self
        }

        pub fn chart_playlists(mut self, playlists: Vec<dto::Playlist>) -> Self {
            self.chart_playlists = playlists;
            self
        }

        pub fn releases(mut self, releases: Vec<dto::Album>) -> Self {
            self.releases = releases;
            self
        }

        pub fn search_hits(mut self, hits: Vec<dto::SearchHit>) -> Self {
            self.search_hits = hits;
            self
        }

        /// Number of calls received for an operation name.
        pub fn calls(&self, operation: &str) -> usize {
            self.calls.lock().iter().filter(|c| *c == operation).count()
        }

        /// Fetch limit passed to the last search call.
        pub fn last_search_fetch_limit(&self) -> Option<usize> {
            *self.last_search_fetch_limit.lock()
        }

        fn record(&self, operation: &str) -> Result<(), CatalogError> {
            self.calls.lock().push(operation.to_string());
            match &self.error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CatalogApi for MockCatalog {
        async fn fetch_track(&self, id: &str) -> Result<dto::Track, CatalogError> {
            self.record("fetch_track")?;
            // Let concurrent resolvers interleave like real I/O would
            tokio::task::yield_now().await;
            self.tracks.get(id).cloned().ok_or(CatalogError::NotFound)
        }

        async fn top_artists(&self, limit: usize) -> Result<Vec<dto::Artist>, CatalogError> {
            self.record("top_artists")?;
            Ok(self.chart_artists.iter().take(limit).cloned().collect())
        }

        async fn top_tracks(&self, limit: usize) -> Result<Vec<dto::Track>, CatalogError> {
            self.record("top_tracks")?;
            Ok(self.chart_tracks.iter().take(limit).cloned().collect())
        }

        async fn top_playlists(&self, limit: usize) -> Result<Vec<dto::Playlist>, CatalogError> {
            self.record("top_playlists")?;
            Ok(self.chart_playlists.iter().take(limit).cloned().collect())
        }

        async fn fetch_artist(&self, id: &str) -> Result<dto::Artist, CatalogError> {
            self.record("fetch_artist")?;
            self.artists.get(id).cloned().ok_or(CatalogError::NotFound)
        }

        async fn artist_top_tracks(
            &self,
            id: &str,
            limit: usize,
        ) -> Result<Vec<dto::Track>, CatalogError> {
            self.record("artist_top_tracks")?;
            Ok(self
                .artist_top
                .get(id)
                .map(|tracks| tracks.iter().take(limit).cloned().collect())
                .unwrap_or_default())
        }

        async fn fetch_playlist(&self, id: &str) -> Result<dto::PlaylistDetail, CatalogError> {
            self.record("fetch_playlist")?;
            self.playlists.get(id).cloned().ok_or(CatalogError::NotFound)
        }

        async fn new_releases(&self, limit: usize) -> Result<Vec<dto::Album>, CatalogError> {
            self.record("new_releases")?;
            Ok(self.releases.iter().take(limit).cloned().collect())
        }

        async fn search(
            &self,
            _query: &str,
            limits: &SearchLimits,
        ) -> Result<Vec<dto::SearchHit>, CatalogError> {
            *self.last_search_fetch_limit.lock() = Some(limits.fetch_limit());
            self.record("search")?;
            Ok(self
                .search_hits
                .iter()
                .take(limits.fetch_limit())
                .cloned()
                .collect())
        }
    }

    // ------------------------------------------------------------------------
    // Payload fixtures
    // ------------------------------------------------------------------------

    /// A complete track payload.
    pub fn track_payload(
        id: i64,
        title: &str,
        artist_id: i64,
        artist_name: &str,
        cover: Option<&str>,
    ) -> dto::Track {
        dto::Track {
            id: Some(RawId::Number(id)),
            title: Some(title.to_string()),
            title_short: Some(title.to_string()),
            duration: Some(RawNumber::Int(200)),
            rank: Some(RawNumber::Int(900_000 - id)),
            preview: Some(format!("https://cdn.example/preview/{}.mp3", id)),
            artist: Some(dto::ArtistRef {
                id: Some(RawId::Number(artist_id)),
                name: Some(artist_name.to_string()),
                picture_medium: None,
            }),
            album: Some(dto::AlbumRef {
                id: Some(RawId::Number(id * 10)),
                title: Some(format!("{} (Album)", title)),
                cover_medium: cover.map(str::to_string),
            }),
        }
    }

    /// An artist payload with a medium picture.
    pub fn artist_payload(id: i64, name: &str) -> dto::Artist {
        dto::Artist {
            id: Some(RawId::Number(id)),
            name: Some(name.to_string()),
            picture_medium: Some(format!("https://cdn.example/artist/{}.jpg", id)),
            nb_fan: Some(RawNumber::Int(1000)),
            ..Default::default()
        }
    }

    /// An album payload credited to an artist.
    pub fn album_payload(id: i64, title: &str, artist_id: i64, artist_name: &str) -> dto::Album {
        dto::Album {
            id: Some(RawId::Number(id)),
            title: Some(title.to_string()),
            cover_medium: Some(format!("https://cdn.example/album/{}.jpg", id)),
            artist: Some(dto::ArtistRef {
                id: Some(RawId::Number(artist_id)),
                name: Some(artist_name.to_string()),
                picture_medium: None,
            }),
            ..Default::default()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_serves_tracks_and_counts_calls() {
            let mock = MockCatalog::new().track(track_payload(1, "One", 2, "A", None));

            assert!(mock.fetch_track("1").await.is_ok());
            assert!(matches!(
                mock.fetch_track("9").await,
                Err(CatalogError::NotFound)
            ));
            assert_eq!(mock.calls("fetch_track"), 2);
            assert_eq!(mock.calls("search"), 0);
        }

        #[tokio::test]
        async fn test_mock_error_wins() {
            let mock = MockCatalog::with_error(CatalogError::Network("timeout".to_string()))
                .track(track_payload(1, "One", 2, "A", None));
            assert!(matches!(
                mock.fetch_track("1").await,
                Err(CatalogError::Network(_))
            ));
        }

        #[tokio::test]
        async fn test_mock_records_search_fetch_limit() {
            let mock = MockCatalog::new();
            mock.search("daft", &SearchLimits::new(10, 5, 0)).await.unwrap();
            assert_eq!(mock.last_search_fetch_limit(), Some(25));
        }
    }
}
