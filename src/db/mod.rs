//! Database module for the song cache, profiles and playlists.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Song cache lookups and inserts (unique by catalog id)
//! - Profile creation and liked-song membership
//! - Playlist ownership, membership and cover updates
//!
//! Membership tables use composite primary keys, so adding a song twice is
//! a no-op at the storage level and the functions below report whether a
//! row was actually changed.
//!
//! # Example
//!
//! ```ignore
//! use tunedeck::db::{init_db, get_song_by_external_id};
//!
//! let pool = init_db("sqlite:tunedeck.db").await?;
//! let song = get_song_by_external_id(&pool, "3135556").await?;
//! ```

use std::collections::HashSet;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{NewSong, Playlist, PlaylistChoice, PlaylistId, Song, UserId, UserProfile};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "tunedeck.db";

/// Song columns, for queries that alias `songs` as `s`.
const SONG_COLUMNS: &str =
    "s.id, s.external_id, s.title, s.artist_name, s.album_cover_url, s.preview_url, s.duration";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

// ============================================================================
// Songs
// ============================================================================

/// Look up a cached song by its catalog id.
pub async fn get_song_by_external_id(
    pool: &SqlitePool,
    external_id: &str,
) -> sqlx::Result<Option<Song>> {
    sqlx::query_as(&format!(
        "SELECT {} FROM songs s WHERE s.external_id = ?",
        SONG_COLUMNS
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await
}

/// Insert a new song and return the stored row.
///
/// Fails with a unique violation if the catalog id is already cached;
/// callers racing on the same id should re-read on that error.
pub async fn insert_song(pool: &SqlitePool, song: &NewSong) -> sqlx::Result<Song> {
    let result = sqlx::query(
        "INSERT INTO songs (external_id, title, artist_name, album_cover_url, preview_url, duration)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&song.external_id)
    .bind(&song.title)
    .bind(&song.artist_name)
    .bind(&song.album_cover_url)
    .bind(&song.preview_url)
    .bind(song.duration_seconds)
    .execute(pool)
    .await?;

    sqlx::query_as(&format!("SELECT {} FROM songs s WHERE s.id = ?", SONG_COLUMNS))
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

/// Total number of cached songs.
pub async fn count_songs(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ============================================================================
// Profiles and likes
// ============================================================================

/// Get the profile for a user, creating it on first need.
///
/// Idempotent and safe against concurrent callers.
pub async fn ensure_profile(pool: &SqlitePool, user_id: UserId) -> sqlx::Result<UserProfile> {
    sqlx::query("INSERT INTO user_profiles (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;

    sqlx::query_as("SELECT id, user_id FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Catalog ids of every song a profile likes.
pub async fn liked_external_ids(
    pool: &SqlitePool,
    profile_id: i64,
) -> sqlx::Result<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT s.external_id FROM songs s
         JOIN profile_liked_songs l ON l.song_id = s.id
         WHERE l.profile_id = ?",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Whether a profile likes a song.
pub async fn is_liked(pool: &SqlitePool, profile_id: i64, song_id: i64) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM profile_liked_songs WHERE profile_id = ? AND song_id = ?",
    )
    .bind(profile_id)
    .bind(song_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Add a like. Returns `false` if it was already present.
pub async fn add_like(pool: &SqlitePool, profile_id: i64, song_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO profile_liked_songs (profile_id, song_id) VALUES (?, ?)",
    )
    .bind(profile_id)
    .bind(song_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a like. Returns `false` if it was not present.
pub async fn remove_like(pool: &SqlitePool, profile_id: i64, song_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM profile_liked_songs WHERE profile_id = ? AND song_id = ?")
        .bind(profile_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Songs a profile likes, ordered by title.
pub async fn liked_songs(pool: &SqlitePool, profile_id: i64) -> sqlx::Result<Vec<Song>> {
    sqlx::query_as(&format!(
        "SELECT {} FROM songs s
         JOIN profile_liked_songs l ON l.song_id = s.id
         WHERE l.profile_id = ?
         ORDER BY s.title COLLATE NOCASE, s.id",
        SONG_COLUMNS
    ))
    .bind(profile_id)
    .fetch_all(pool)
    .await
}

// ============================================================================
// Playlists
// ============================================================================

/// Create an empty playlist without a cover.
pub async fn create_playlist(
    pool: &SqlitePool,
    owner_id: UserId,
    name: &str,
) -> sqlx::Result<Playlist> {
    let result = sqlx::query("INSERT INTO playlists (name, owner_id) VALUES (?, ?)")
        .bind(name)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(Playlist {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        owner_id,
        cover_image_url: None,
    })
}

/// Fetch a playlist only if `owner_id` owns it.
///
/// Missing and foreign playlists both yield `None`.
pub async fn get_owned_playlist(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    owner_id: UserId,
) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as(
        "SELECT id, name, owner_id, cover_image_url FROM playlists WHERE id = ? AND owner_id = ?",
    )
    .bind(playlist_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a playlist regardless of owner.
pub async fn get_playlist(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as("SELECT id, name, owner_id, cover_image_url FROM playlists WHERE id = ?")
        .bind(playlist_id)
        .fetch_optional(pool)
        .await
}

/// A user's playlists, newest first.
pub async fn list_playlists(pool: &SqlitePool, owner_id: UserId) -> sqlx::Result<Vec<Playlist>> {
    sqlx::query_as(
        "SELECT id, name, owner_id, cover_image_url FROM playlists
         WHERE owner_id = ? ORDER BY id DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

/// `{id, name}` pairs of a user's playlists, ordered by name.
pub async fn playlist_choices(
    pool: &SqlitePool,
    owner_id: UserId,
) -> sqlx::Result<Vec<PlaylistChoice>> {
    sqlx::query_as(
        "SELECT id, name FROM playlists WHERE owner_id = ? ORDER BY name COLLATE NOCASE, id",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

/// Whether a song is in a playlist.
pub async fn playlist_contains(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    song_id: i64,
) -> sqlx::Result<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Add a song to a playlist. Returns `false` if it was already present.
pub async fn add_playlist_song(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    song_id: i64,
) -> sqlx::Result<bool> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO playlist_songs (playlist_id, song_id) VALUES (?, ?)")
            .bind(playlist_id)
            .bind(song_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a song from a playlist. Returns `false` if it was not present.
pub async fn remove_playlist_song(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    song_id: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Songs of a playlist, ordered by title.
pub async fn playlist_songs(pool: &SqlitePool, playlist_id: PlaylistId) -> sqlx::Result<Vec<Song>> {
    sqlx::query_as(&format!(
        "SELECT {} FROM songs s
         JOIN playlist_songs p ON p.song_id = s.id
         WHERE p.playlist_id = ?
         ORDER BY s.title COLLATE NOCASE, s.id",
        SONG_COLUMNS
    ))
    .bind(playlist_id)
    .fetch_all(pool)
    .await
}

/// Album cover of every member song (`None` for songs without one).
///
/// The result length equals the number of member songs.
pub async fn playlist_song_covers(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
) -> sqlx::Result<Vec<Option<String>>> {
    let rows: Vec<(Option<String>,)> = sqlx::query_as(
        "SELECT s.album_cover_url FROM songs s
         JOIN playlist_songs p ON p.song_id = s.id
         WHERE p.playlist_id = ?
         ORDER BY s.id",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(cover,)| cover).collect())
}

/// Overwrite a playlist's derived cover.
pub async fn set_playlist_cover(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    cover_image_url: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE playlists SET cover_image_url = ? WHERE id = ?")
        .bind(cover_image_url)
        .bind(playlist_id)
        .execute(pool)
        .await?;
    Ok(())
}
