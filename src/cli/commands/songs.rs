//! Song commands: resolution, previews and likes.

use tokio::runtime::Runtime;

use super::report;
use crate::model::{Song, UserId};
use crate::service::MusicService;

/// Cache a track and print the stored song
pub fn cmd_resolve(rt: &Runtime, service: &MusicService, id: &str) -> anyhow::Result<()> {
    let song = rt.block_on(service.resolve_song(id)).map_err(report)?;

    println!("Song #{}", song.id);
    println!("  Track:    {}", song.external_id);
    println!("  Title:    {}", song.title);
    println!("  Artist:   {}", song.artist_name);
    println!("  Duration: {}", song.duration_formatted());
    if let Some(cover) = &song.album_cover_url {
        println!("  Cover:    {}", cover);
    }
    if let Some(preview) = &song.preview_url {
        println!("  Preview:  {}", preview);
    }
    Ok(())
}

/// Print a freshly fetched preview URL
pub fn cmd_preview(rt: &Runtime, service: &MusicService, id: &str) -> anyhow::Result<()> {
    match rt.block_on(service.fresh_preview(id)).map_err(report)? {
        Some(url) => println!("{}", url),
        None => println!("No preview available for track {}.", id.trim()),
    }
    Ok(())
}

/// Toggle the like on a track
pub fn cmd_like(
    rt: &Runtime,
    service: &MusicService,
    user: UserId,
    id: &str,
) -> anyhow::Result<()> {
    let outcome = rt.block_on(service.toggle_like(user, id)).map_err(report)?;
    let mark = if outcome.liked { "♥" } else { "♡" };
    println!("{} {} \"{}\"", mark, capitalize(outcome.action.as_str()), outcome.title);
    Ok(())
}

/// List the user's liked songs
pub fn cmd_liked(rt: &Runtime, service: &MusicService, user: UserId) -> anyhow::Result<()> {
    let songs = rt.block_on(service.liked_songs(user)).map_err(report)?;

    if songs.is_empty() {
        println!("No liked songs yet.");
        return Ok(());
    }

    println!("Liked songs ({})", songs.len());
    print_songs(&songs);
    Ok(())
}

pub(super) fn print_songs(songs: &[Song]) {
    for song in songs {
        println!(
            "  {:>12}  {} - {} [{}]",
            song.external_id,
            song.title,
            song.artist_name,
            song.duration_formatted()
        );
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
