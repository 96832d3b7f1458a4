//! User playlist commands.

use tokio::runtime::Runtime;

use super::songs::print_songs;
use super::{PlaylistAction, report};
use crate::library::{CoverChange, PlaylistMutation};
use crate::model::UserId;
use crate::service::MusicService;

/// Run a playlist subcommand for `user`
pub fn cmd_playlists(
    rt: &Runtime,
    service: &MusicService,
    user: UserId,
    action: &PlaylistAction,
) -> anyhow::Result<()> {
    match action {
        PlaylistAction::Create { name } => {
            let playlist = rt
                .block_on(service.create_playlist(user, name))
                .map_err(report)?;
            println!("Created playlist #{} \"{}\"", playlist.id, playlist.name);
        }
        PlaylistAction::List { by_name } => {
            if *by_name {
                let choices = rt
                    .block_on(service.playlist_choices(user))
                    .map_err(report)?;
                for choice in &choices {
                    println!("  {:>6}  {}", choice.id, choice.name);
                }
                if choices.is_empty() {
                    println!("No playlists yet.");
                }
            } else {
                let playlists = rt
                    .block_on(service.list_playlists(user))
                    .map_err(report)?;
                for playlist in &playlists {
                    let cover = if playlist.cover_image_url.is_some() { "▣" } else { "□" };
                    println!("  {} {:>6}  {}", cover, playlist.id, playlist.name);
                }
                if playlists.is_empty() {
                    println!("No playlists yet.");
                }
            }
        }
        PlaylistAction::Show { playlist_id } => {
            let detail = rt
                .block_on(service.user_playlist_detail(user, *playlist_id))
                .map_err(report)?;
            println!("{} ({} songs)", detail.playlist.name, detail.songs.len());
            if let Some(cover) = &detail.playlist.cover_image_url {
                println!("Cover: {}", cover);
            }
            print_songs(&detail.songs);
        }
        PlaylistAction::Add {
            playlist_id,
            track_id,
        } => {
            let mutation = rt
                .block_on(service.add_song_to_playlist(*playlist_id, user, track_id))
                .map_err(report)?;
            print_mutation(&mutation);
        }
        PlaylistAction::Remove {
            playlist_id,
            track_id,
        } => {
            let mutation = rt
                .block_on(service.remove_song_from_playlist(*playlist_id, user, track_id))
                .map_err(report)?;
            print_mutation(&mutation);
        }
        PlaylistAction::AddMany {
            track_id,
            playlist_ids,
        } => {
            let results = rt
                .block_on(service.add_song_to_playlists(user, track_id, playlist_ids))
                .map_err(report)?;
            if results.is_empty() {
                println!("No playlists given.");
            }
            for (playlist_id, result) in &results {
                println!("  #{:<6} {}", playlist_id, result.message());
            }
        }
    }
    Ok(())
}

fn print_mutation(mutation: &PlaylistMutation) {
    let title = mutation
        .song
        .as_ref()
        .map(|s| s.title.as_str())
        .unwrap_or("Song");
    println!(
        "{}: \"{}\" / \"{}\"",
        mutation.result.message(),
        title,
        mutation.playlist.name
    );
    match &mutation.cover {
        CoverChange::Set(url) => println!("Cover updated: {}", url),
        CoverChange::Cleared => println!("Cover cleared"),
        CoverChange::Skipped | CoverChange::Unchanged => {}
    }
}
