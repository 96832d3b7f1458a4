//! Catalog search: bucketing, normalization and artist prioritization.
//!
//! One catalog call per search. Hits are bucketed by their declared type,
//! normalized, and each bucket is cut to its limit in catalog order.
//! A catalog failure (including a missing `data` list) is a
//! [`SearchFailure`]; zero hits is a successful, empty result.

use std::sync::Arc;

use crate::catalog::adapter::{normalize_album, normalize_artist, normalize_track};
use crate::catalog::dto::SearchHit;
use crate::catalog::{Artist, CatalogApi, CatalogError, SearchLimits, SearchResults, Track};
use crate::error::FailureKind;

/// A search the catalog could not answer
#[derive(Debug, thiserror::Error)]
#[error("Search for {query:?} failed: {source}")]
pub struct SearchFailure {
    pub query: String,
    #[source]
    pub source: CatalogError,
}

impl SearchFailure {
    /// Machine-readable failure kind.
    pub fn kind(&self) -> FailureKind {
        self.source.kind()
    }
}

/// Split raw hits into normalized, truncated buckets.
///
/// Records missing required fields are dropped before they count
/// against a bucket's limit.
pub fn bucketize(hits: &[SearchHit], limits: &SearchLimits) -> SearchResults {
    let mut results = SearchResults::default();

    for hit in hits {
        match hit {
            SearchHit::Track(raw) if results.tracks.len() < limits.tracks => {
                results.tracks.extend(normalize_track(raw));
            }
            SearchHit::Artist(raw) if results.artists.len() < limits.artists => {
                results.artists.extend(normalize_artist(raw));
            }
            SearchHit::Album(raw) if results.albums.len() < limits.albums => {
                results.albums.extend(normalize_album(raw));
            }
            _ => {}
        }
    }

    results
}

/// Composes catalog search with artist fallbacks.
#[derive(Clone)]
pub struct SearchAggregator {
    catalog: Arc<dyn CatalogApi>,
}

impl SearchAggregator {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Search tracks, artists and albums.
    ///
    /// A blank query returns empty results without calling the catalog.
    pub async fn search(
        &self,
        query: &str,
        limits: &SearchLimits,
    ) -> Result<SearchResults, SearchFailure> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }

        tracing::info!(query, fetch_limit = limits.fetch_limit(), "Searching catalog");
        let hits = self.catalog.search(query, limits).await.map_err(|e| {
            tracing::error!(query, error = %e, "Catalog search failed");
            SearchFailure {
                query: query.to_string(),
                source: e,
            }
        })?;

        let results = bucketize(&hits, limits);
        tracing::debug!(
            query,
            hits = hits.len(),
            tracks = results.tracks.len(),
            artists = results.artists.len(),
            albums = results.albums.len(),
            "Bucketed search results"
        );
        Ok(results)
    }

    /// Search with the top track's artist forced to the front.
    ///
    /// The artist comes from the returned artist bucket when present,
    /// otherwise from one extra artist lookup, otherwise a placeholder
    /// built from the track. Remaining slots are filled from the bucket
    /// without duplicates, up to `limits.artists`.
    pub async fn interactive_search(
        &self,
        query: &str,
        limits: &SearchLimits,
    ) -> Result<SearchResults, SearchFailure> {
        let mut results = self.search(query, limits).await?;
        if limits.artists == 0 {
            return Ok(results);
        }

        let Some((artist_id, artist_name)) = results.tracks.first().and_then(top_track_artist)
        else {
            return Ok(results);
        };

        let bucket = std::mem::take(&mut results.artists);
        let priority = match bucket.iter().find(|a| a.id == artist_id) {
            Some(artist) => {
                tracing::debug!(artist_id, "Top track artist already in results");
                artist.clone()
            }
            None => self.fetch_priority_artist(&artist_id, &artist_name).await,
        };

        results.artists = prioritize(priority, bucket, limits.artists);
        Ok(results)
    }

    async fn fetch_priority_artist(&self, artist_id: &str, artist_name: &str) -> Artist {
        tracing::info!(artist_id, artist_name, "Top track artist not in results, fetching");
        match self.catalog.fetch_artist(artist_id).await {
            Ok(raw) => match normalize_artist(&raw) {
                Some(artist) => return artist,
                None => tracing::warn!(artist_id, "Artist payload incomplete, using placeholder"),
            },
            Err(e) => tracing::warn!(artist_id, error = %e, "Artist lookup failed, using placeholder"),
        }

        Artist {
            id: artist_id.to_string(),
            name: artist_name.to_string(),
            picture_medium: None,
        }
    }
}

fn top_track_artist(track: &Track) -> Option<(String, String)> {
    let id = track.artist_id.clone().filter(|id| !id.is_empty())?;
    Some((id, track.artist_name.clone()))
}

/// Put `first` in front of `rest`, skipping duplicates, capped at `limit`.
fn prioritize(first: Artist, rest: Vec<Artist>, limit: usize) -> Vec<Artist> {
    let mut artists = Vec::with_capacity(limit);
    artists.push(first);
    for artist in rest {
        if artists.len() >= limit {
            break;
        }
        if artists.iter().any(|a| a.id == artist.id) {
            continue;
        }
        artists.push(artist);
    }
    artists.truncate(limit);
    artists
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::{MockCatalog, album_payload, artist_payload, track_payload};

    fn hits() -> Vec<SearchHit> {
        let mut incomplete = track_payload(3, "No Album", 9, "X", None);
        incomplete.album = None;
        vec![
            SearchHit::Track(track_payload(1, "Get Lucky", 27, "Daft Punk", None)),
            SearchHit::Artist(artist_payload(100, "Other Artist")),
            SearchHit::Track(incomplete),
            SearchHit::Album(album_payload(500, "Discovery", 27, "Daft Punk")),
            SearchHit::Other,
            SearchHit::Track(track_payload(2, "One More Time", 27, "Daft Punk", None)),
            SearchHit::Artist(artist_payload(101, "Another Artist")),
        ]
    }

    fn aggregator(mock: &Arc<MockCatalog>) -> SearchAggregator {
        SearchAggregator::new(mock.clone())
    }

    #[test]
    fn test_bucketize_drops_incomplete_and_keeps_order() {
        let results = bucketize(&hits(), &SearchLimits::new(10, 6, 6));

        let track_ids: Vec<_> = results.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(track_ids, vec!["1", "2"]);
        assert_eq!(results.tracks[0].artist_id.as_deref(), Some("27"));
        assert!(results.tracks[0].rank.is_some());
        assert_eq!(results.artists.len(), 2);
        assert_eq!(results.albums[0].artist_name.as_deref(), Some("Daft Punk"));
    }

    #[test]
    fn test_bucketize_truncates_each_bucket() {
        let results = bucketize(&hits(), &SearchLimits::new(1, 1, 0));
        assert_eq!(results.tracks.len(), 1);
        assert_eq!(results.artists.len(), 1);
        assert!(results.albums.is_empty());
    }

    #[tokio::test]
    async fn test_search_requests_headroom() {
        let mock = Arc::new(MockCatalog::new().search_hits(hits()));
        let results = aggregator(&mock)
            .search("daft punk", &SearchLimits::new(10, 6, 6))
            .await
            .unwrap();

        assert!(results.has_results());
        assert_eq!(mock.last_search_fetch_limit(), Some(25));
        assert_eq!(mock.calls("search"), 1);
    }

    #[tokio::test]
    async fn test_zero_hits_is_success() {
        let mock = Arc::new(MockCatalog::new());
        let results = aggregator(&mock)
            .search("nothing matches", &SearchLimits::default())
            .await
            .unwrap();
        assert!(!results.has_results());
    }

    #[tokio::test]
    async fn test_blank_query_skips_catalog() {
        let mock = Arc::new(MockCatalog::new().search_hits(hits()));
        let results = aggregator(&mock)
            .search("  ", &SearchLimits::default())
            .await
            .unwrap();
        assert!(!results.has_results());
        assert_eq!(mock.calls("search"), 0);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_search_failure() {
        let mock = Arc::new(MockCatalog::with_error(CatalogError::MalformedPayload(
            "no data".to_string(),
        )));
        let err = aggregator(&mock)
            .search("daft", &SearchLimits::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedPayload);
        assert_eq!(err.query, "daft");
    }

    #[tokio::test]
    async fn test_priority_artist_fetched_once_and_first() {
        let mock = Arc::new(
            MockCatalog::new()
                .search_hits(hits())
                .artist(artist_payload(27, "Daft Punk")),
        );
        let results = aggregator(&mock)
            .interactive_search("daft", &SearchLimits::new(10, 2, 0))
            .await
            .unwrap();

        assert_eq!(mock.calls("fetch_artist"), 1);
        let ids: Vec<_> = results.artists.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["27", "100"]);
        assert!(results.artists[0].picture_medium.is_some());
        assert!(results.albums.is_empty());
    }

    #[tokio::test]
    async fn test_priority_artist_from_bucket_needs_no_fetch() {
        let mut hits = hits();
        hits.push(SearchHit::Artist(artist_payload(27, "Daft Punk")));
        let mock = Arc::new(MockCatalog::new().search_hits(hits));

        let results = aggregator(&mock)
            .interactive_search("daft", &SearchLimits::new(10, 5, 0))
            .await
            .unwrap();

        assert_eq!(mock.calls("fetch_artist"), 0);
        let ids: Vec<_> = results.artists.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["27", "100", "101"]);
    }

    #[tokio::test]
    async fn test_priority_artist_placeholder_when_lookup_fails() {
        let mock = Arc::new(MockCatalog::new().search_hits(hits()));

        let results = aggregator(&mock)
            .interactive_search("daft", &SearchLimits::new(10, 5, 0))
            .await
            .unwrap();

        assert_eq!(mock.calls("fetch_artist"), 1);
        let first = &results.artists[0];
        assert_eq!(first.id, "27");
        assert_eq!(first.name, "Daft Punk");
        assert_eq!(first.picture_medium, None);
        assert_eq!(results.artists.len(), 3);
    }

    #[tokio::test]
    async fn test_no_tracks_leaves_artists_alone() {
        let mock = Arc::new(
            MockCatalog::new().search_hits(vec![SearchHit::Artist(artist_payload(1, "Solo"))]),
        );
        let results = aggregator(&mock)
            .interactive_search("solo", &SearchLimits::new(10, 5, 0))
            .await
            .unwrap();

        assert_eq!(results.artists.len(), 1);
        assert_eq!(mock.calls("fetch_artist"), 0);
    }

    #[test]
    fn test_prioritize_dedupes_and_caps() {
        let artist = |id: &str| Artist {
            id: id.to_string(),
            name: id.to_string(),
            picture_medium: None,
        };
        let out = prioritize(
            artist("a"),
            vec![artist("b"), artist("a"), artist("c"), artist("d")],
            3,
        );
        let ids: Vec<_> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
