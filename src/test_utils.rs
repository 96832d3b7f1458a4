//! Test utilities and fixtures for tunedeck tests.
//!
//! This module provides common test helpers, mock factories, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use tunedeck::test_utils::{temp_db, insert_mock_song};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (pool, _dir) = temp_db().await;
//!     let song = insert_mock_song(&pool, "42", None).await;
//!     // ... test logic
//! }
//! ```

use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::model::{NewSong, Song};

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = crate::db::db_url(Some(&db_path));

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Creates a mock NewSong with sensible defaults.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let custom = NewSong {
///     title: "Custom Title".to_string(),
///     ..mock_new_song("42", None)
/// };
/// ```
pub fn mock_new_song(external_id: &str, cover: Option<&str>) -> NewSong {
    NewSong {
        external_id: external_id.to_string(),
        title: format!("Song {}", external_id),
        artist_name: "Test Artist".to_string(),
        album_cover_url: cover.map(str::to_string),
        preview_url: Some(format!("https://cdn.example/preview/{}.mp3", external_id)),
        duration_seconds: Some(180),
    }
}

/// Inserts a mock song into the database and returns the stored row.
pub async fn insert_mock_song(pool: &SqlitePool, external_id: &str, cover: Option<&str>) -> Song {
    crate::db::insert_song(pool, &mock_new_song(external_id, cover))
        .await
        .expect("Failed to insert song")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        let (pool, _dir) = temp_db().await;
        assert_eq!(crate::db::count_songs(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_mock_song() {
        let (pool, _dir) = temp_db().await;

        let song = insert_mock_song(&pool, "42", Some("https://c/42.jpg")).await;
        assert!(song.id > 0);
        assert_eq!(song.external_id, "42");
        assert_eq!(song.album_cover_url.as_deref(), Some("https://c/42.jpg"));
    }

    #[test]
    fn test_mock_new_song_defaults() {
        let song = mock_new_song("7", None);
        assert_eq!(song.title, "Song 7");
        assert_eq!(song.artist_name, "Test Artist");
        assert_eq!(song.album_cover_url, None);
        assert_eq!(song.duration_seconds, Some(180));
    }
}
