//! Catalog browsing commands: charts, releases, search and detail pages.

use tokio::runtime::Runtime;

use super::{ChartKind, report};
use crate::catalog::{Album, Artist, Track};
use crate::model::UserId;
use crate::service::MusicService;

/// Show one or all charts
pub fn cmd_charts(
    rt: &Runtime,
    service: &MusicService,
    user: Option<UserId>,
    kind: ChartKind,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let limits = service.limits().clone();
    rt.block_on(async {
        if matches!(kind, ChartKind::Tracks | ChartKind::All) {
            let mut tracks = service
                .top_tracks(limit.unwrap_or(limits.top_tracks))
                .await;
            service.annotate_liked(user, &mut tracks).await;
            println!("Top tracks");
            println!("==========");
            print_tracks(&tracks);
            println!();
        }

        if matches!(kind, ChartKind::Artists | ChartKind::All) {
            let artists = service
                .top_artists(limit.unwrap_or(limits.top_artists))
                .await;
            println!("Top artists");
            println!("===========");
            print_artists(&artists);
            println!();
        }

        if matches!(kind, ChartKind::Playlists | ChartKind::All) {
            let playlists = service
                .top_playlists(limit.unwrap_or(limits.top_playlists))
                .await;
            println!("Top playlists");
            println!("=============");
            if playlists.is_empty() {
                println!("  (nothing to show)");
            }
            for playlist in &playlists {
                println!("  {:>12}  {} - {}", playlist.id, playlist.title, playlist.subtitle);
            }
        }
    });
    Ok(())
}

/// Show editorial new releases
pub fn cmd_releases(
    rt: &Runtime,
    service: &MusicService,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(service.limits().new_releases);
    let releases = rt.block_on(service.new_releases(limit));

    if releases.is_empty() {
        println!("No releases available right now.");
    }
    for release in &releases {
        let date = release.release_date.as_deref().unwrap_or("");
        println!(
            "  {:>12}  {} - {}  {}",
            release.id, release.title, release.artist_name, date
        );
    }
    Ok(())
}

/// Search the catalog
pub fn cmd_search(
    rt: &Runtime,
    service: &MusicService,
    user: Option<UserId>,
    query: &str,
    interactive: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let mut results = if interactive {
            service.interactive_search(query).await
        } else {
            service
                .search_catalog(query, &service.limits().search())
                .await
        }
        .map_err(report)?;

        if !results.has_results() {
            println!("No results for {:?}.", query);
            return Ok(());
        }

        service.annotate_liked(user, &mut results.tracks).await;

        println!("Tracks");
        print_tracks(&results.tracks);
        println!("\nArtists");
        print_artists(&results.artists);
        if !interactive {
            println!("\nAlbums");
            print_albums(&results.albums);
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Show an artist profile
pub fn cmd_artist(
    rt: &Runtime,
    service: &MusicService,
    user: Option<UserId>,
    id: &str,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let Some(mut artist) = service.artist_detail(id).await else {
            anyhow::bail!("Artist not found or could not be loaded.");
        };
        service.annotate_liked(user, &mut artist.top_tracks).await;

        println!("{}", artist.name);
        println!("{}", "=".repeat(artist.name.chars().count()));
        if let Some(fans) = artist.nb_fan {
            println!("Fans:   {}", fans);
        }
        if let Some(albums) = artist.nb_album {
            println!("Albums: {}", albums);
        }
        if let Some(link) = &artist.link {
            println!("Link:   {}", link);
        }
        println!("\nTop tracks");
        print_tracks(&artist.top_tracks);
        Ok(())
    })
}

/// Show a catalog playlist
pub fn cmd_playlist(
    rt: &Runtime,
    service: &MusicService,
    user: Option<UserId>,
    id: &str,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let Some(mut playlist) = service.playlist_detail(id).await else {
            anyhow::bail!("Playlist not found or could not be loaded.");
        };
        service.annotate_liked(user, &mut playlist.tracks).await;

        println!("{} (by {})", playlist.title, playlist.creator_name);
        if let Some(description) = playlist.description.as_deref().filter(|d| !d.is_empty()) {
            println!("{}", description);
        }
        println!(
            "{} tracks, {}",
            playlist.nb_tracks.unwrap_or(playlist.tracks.len() as i64),
            playlist.duration_total_formatted
        );
        println!();
        print_tracks(&playlist.tracks);
        Ok(())
    })
}

// ============================================================================
// Output helpers
// ============================================================================

fn liked_marker(is_liked: Option<bool>) -> &'static str {
    if is_liked == Some(true) { "♥" } else { " " }
}

pub(super) fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        println!("  (nothing to show)");
    }
    for track in tracks {
        println!(
            "  {} {:>12}  {} - {} [{}]",
            liked_marker(track.is_liked),
            track.id,
            track.title,
            track.artist_name,
            track.duration_formatted
        );
    }
}

fn print_artists(artists: &[Artist]) {
    if artists.is_empty() {
        println!("  (nothing to show)");
    }
    for artist in artists {
        println!("  {:>12}  {}", artist.id, artist.name);
    }
}

fn print_albums(albums: &[Album]) {
    if albums.is_empty() {
        println!("  (nothing to show)");
    }
    for album in albums {
        println!(
            "  {:>12}  {} - {}",
            album.id,
            album.title,
            album.artist_name.as_deref().unwrap_or("Unknown Artist")
        );
    }
}
