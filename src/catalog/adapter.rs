//! Adapter layer: Convert Deezer DTOs to normalized records
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! Every function here is pure and returns `None` (the record is dropped)
//! when a required field is missing; nothing in this file errors.
//!
//! Required fields:
//! - Track: id, title, artist, album, duration
//! - Artist: id, name
//! - Album: id, title, artist

use super::domain::{
    Album, AlbumRelease, Artist, ArtistDetail, PlaylistDetail, PlaylistSummary, Track,
};
use super::dto::{self, RawNumber};

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const VARIOUS_ARTISTS: &str = "Various Artists";
const DEFAULT_CREATOR: &str = "Deezer";

/// Format a duration in seconds as `M:SS`.
///
/// Negative and missing durations format as `0:00`.
pub fn format_seconds(seconds: Option<i64>) -> String {
    match seconds {
        Some(s) if s >= 0 => format!("{}:{:02}", s / 60, s % 60),
        _ => "0:00".to_string(),
    }
}

/// Format a raw API duration (number, numeric string or garbage) as `M:SS`.
pub fn format_duration(raw: Option<&RawNumber>) -> String {
    format_seconds(raw.and_then(RawNumber::as_i64))
}

/// Short title if present, else the full title.
fn preferred_title(track: &dto::Track) -> Option<String> {
    non_blank(track.title_short.as_deref()).or_else(|| non_blank(track.title.as_deref()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

fn id_key(id: Option<&dto::RawId>) -> Option<String> {
    id.and_then(dto::RawId::key)
}

/// Normalize a track from a chart or search result.
///
/// Returns `None` unless id, title, artist, album and duration are all present.
pub fn normalize_track(raw: &dto::Track) -> Option<Track> {
    raw.duration.as_ref()?;
    let artist = raw.artist.as_ref()?;
    let mut track = build_track(raw, None)?;
    track.artist_id = id_key(artist.id.as_ref());
    Some(track)
}

/// Normalize a track embedded in an artist or playlist page.
///
/// Duration is optional here. `artist_name` overrides the embedded artist
/// (artist top tracks take the profile's name); without it the embedded
/// artist is required.
pub fn normalize_embedded_track(raw: &dto::Track, artist_name: Option<&str>) -> Option<Track> {
    if artist_name.is_none() {
        raw.artist.as_ref()?;
    }
    build_track(raw, artist_name)
}

fn build_track(raw: &dto::Track, artist_override: Option<&str>) -> Option<Track> {
    let id = id_key(raw.id.as_ref())?;
    let title = preferred_title(raw)?;
    let album = raw.album.as_ref()?;

    let artist_name = artist_override
        .map(str::to_string)
        .or_else(|| raw.artist.as_ref().and_then(|a| non_blank(a.name.as_deref())))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let duration_seconds = raw.duration.as_ref().and_then(RawNumber::as_i64);

    Some(Track {
        id,
        title,
        artist_name,
        artist_id: None,
        album_cover_medium: album.cover_medium.clone(),
        duration_formatted: format_seconds(duration_seconds),
        duration_seconds,
        preview_url: raw.preview.clone(),
        rank: raw.rank.as_ref().and_then(RawNumber::as_i64),
        is_liked: None,
    })
}

/// Normalize an artist card. Requires id and name.
pub fn normalize_artist(raw: &dto::Artist) -> Option<Artist> {
    Some(Artist {
        id: id_key(raw.id.as_ref())?,
        name: non_blank(raw.name.as_deref())?,
        picture_medium: raw.picture_medium.clone(),
    })
}

/// Normalize an album search hit. Requires id, title and artist.
pub fn normalize_album(raw: &dto::Album) -> Option<Album> {
    let id = id_key(raw.id.as_ref())?;
    let title = non_blank(raw.title.as_deref())?;
    let artist = raw.artist.as_ref()?;
    Some(Album {
        id,
        title,
        picture_medium: raw.cover_medium.clone(),
        artist_name: artist.name.clone(),
        artist_id: id_key(artist.id.as_ref()),
    })
}

/// Normalize a chart playlist. Requires id and title.
pub fn normalize_playlist_summary(raw: &dto::Playlist) -> Option<PlaylistSummary> {
    let id = id_key(raw.id.as_ref())?;
    let title = non_blank(raw.title.as_deref())?;

    let subtitle = match non_blank(raw.description.as_deref()) {
        Some(description) => description,
        None => {
            let creator = raw
                .user
                .as_ref()
                .and_then(|u| u.name.clone())
                .unwrap_or_else(|| DEFAULT_CREATOR.to_string());
            format!("By {}", creator)
        }
    };

    Some(PlaylistSummary {
        id,
        title,
        picture_medium: raw.picture_medium.clone(),
        subtitle,
        link: raw.link.clone(),
    })
}

/// Normalize an editorial release. Requires id and title; the artist
/// defaults to "Various Artists".
pub fn normalize_album_release(raw: &dto::Album) -> Option<AlbumRelease> {
    let id = id_key(raw.id.as_ref())?;
    let title = non_blank(raw.title.as_deref())?;
    let artist = raw.artist.as_ref();

    Some(AlbumRelease {
        id,
        title,
        picture_medium: raw.cover_medium.clone(),
        artist_name: artist
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| VARIOUS_ARTISTS.to_string()),
        artist_id: artist.and_then(|a| id_key(a.id.as_ref())),
        link: raw.link.clone(),
        release_date: raw.release_date.clone(),
    })
}

/// Build an artist profile. Requires id and name.
pub fn to_artist_detail(raw: &dto::Artist, top_tracks: &[dto::Track]) -> Option<ArtistDetail> {
    let id = id_key(raw.id.as_ref())?;
    let name = non_blank(raw.name.as_deref())?;

    let top_tracks = top_tracks
        .iter()
        .filter_map(|t| normalize_embedded_track(t, Some(&name)))
        .collect();

    Some(ArtistDetail {
        id,
        picture_small: raw.picture_small.clone(),
        picture_medium: raw.picture_medium.clone(),
        picture_big: raw.picture_big.clone(),
        picture_xl: raw.picture_xl.clone(),
        nb_album: raw.nb_album.as_ref().and_then(RawNumber::as_i64),
        nb_fan: raw.nb_fan.as_ref().and_then(RawNumber::as_i64),
        link: raw.link.clone(),
        name,
        top_tracks,
    })
}

/// Build a catalog playlist page. Requires id and title.
///
/// Embedded tracks that are not objects or lack required fields are dropped.
pub fn to_playlist_detail(raw: &dto::PlaylistDetail) -> Option<PlaylistDetail> {
    let id = id_key(raw.id.as_ref())?;
    let title = non_blank(raw.title.as_deref())?;

    let tracks = raw
        .tracks
        .as_ref()
        .map(|page| {
            page.data
                .iter()
                .filter_map(|value| serde_json::from_value::<dto::Track>(value.clone()).ok())
                .filter_map(|t| normalize_embedded_track(&t, None))
                .collect()
        })
        .unwrap_or_default();

    let creator = raw.creator.as_ref();

    Some(PlaylistDetail {
        id,
        title,
        description: raw.description.clone(),
        duration_total_formatted: format_duration(raw.duration.as_ref()),
        nb_tracks: raw.nb_tracks.as_ref().and_then(RawNumber::as_i64),
        fans: raw.fans.as_ref().and_then(RawNumber::as_i64),
        link: raw.link.clone(),
        picture_small: raw.picture_small.clone(),
        picture_medium: raw.picture_medium.clone(),
        picture_big: raw.picture_big.clone(),
        picture_xl: raw.picture_xl.clone(),
        creator_name: creator
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
        creator_id: creator.and_then(|c| id_key(c.id.as_ref())),
        tracks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dto::RawId;

    fn make_track(id: i64, title: &str) -> dto::Track {
        dto::Track {
            id: Some(RawId::Number(id)),
            title: Some(title.to_string()),
            duration: Some(RawNumber::Int(125)),
            artist: Some(dto::ArtistRef {
                id: Some(RawId::Number(27)),
                name: Some("Daft Punk".to_string()),
                picture_medium: None,
            }),
            album: Some(dto::AlbumRef {
                cover_medium: Some("https://cdn.example/discovery.jpg".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_duration_values() {
        assert_eq!(format_seconds(Some(125)), "2:05");
        assert_eq!(format_seconds(Some(59)), "0:59");
        assert_eq!(format_seconds(Some(-1)), "0:00");
        assert_eq!(format_seconds(None), "0:00");
        assert_eq!(
            format_duration(Some(&RawNumber::Text("not a number".to_string()))),
            "0:00"
        );
        assert_eq!(format_duration(Some(&RawNumber::Text("125".to_string()))), "2:05");
        assert_eq!(format_duration(None), "0:00");
    }

    #[test]
    fn test_normalize_full_track() {
        let track = normalize_track(&make_track(3135556, "Harder")).unwrap();

        assert_eq!(track.id, "3135556");
        assert_eq!(track.title, "Harder");
        assert_eq!(track.artist_name, "Daft Punk");
        assert_eq!(track.artist_id.as_deref(), Some("27"));
        assert_eq!(track.duration_formatted, "2:05");
        assert_eq!(track.duration_seconds, Some(125));
        assert!(track.is_liked.is_none());
    }

    #[test]
    fn test_short_title_preferred() {
        let mut raw = make_track(1, "One More Time (Radio Edit)");
        raw.title_short = Some("One More Time".to_string());
        assert_eq!(normalize_track(&raw).unwrap().title, "One More Time");
    }

    #[test]
    fn test_track_missing_album_is_dropped() {
        let mut raw = make_track(1, "Song");
        raw.album = None;
        assert!(normalize_track(&raw).is_none());
    }

    #[test]
    fn test_track_missing_duration_is_dropped() {
        let mut raw = make_track(1, "Song");
        raw.duration = None;
        assert!(normalize_track(&raw).is_none());
        // Embedded tracks tolerate it
        let embedded = normalize_embedded_track(&raw, None).unwrap();
        assert_eq!(embedded.duration_formatted, "0:00");
    }

    #[test]
    fn test_track_zero_id_is_dropped() {
        assert!(normalize_track(&make_track(0, "Song")).is_none());
    }

    #[test]
    fn test_non_numeric_duration_keeps_track() {
        let mut raw = make_track(1, "Song");
        raw.duration = Some(RawNumber::Text("abc".to_string()));
        let track = normalize_track(&raw).unwrap();
        assert_eq!(track.duration_seconds, None);
        assert_eq!(track.duration_formatted, "0:00");
    }

    #[test]
    fn test_embedded_track_uses_artist_override() {
        let mut raw = make_track(1, "Song");
        raw.artist = None;
        let track = normalize_embedded_track(&raw, Some("Profile Name")).unwrap();
        assert_eq!(track.artist_name, "Profile Name");
        assert!(normalize_embedded_track(&raw, None).is_none());
    }

    #[test]
    fn test_artist_requires_name() {
        let raw = dto::Artist {
            id: Some(RawId::Number(27)),
            ..Default::default()
        };
        assert!(normalize_artist(&raw).is_none());
    }

    #[test]
    fn test_album_requires_artist() {
        let raw = dto::Album {
            id: Some(RawId::Number(302127)),
            title: Some("Discovery".to_string()),
            ..Default::default()
        };
        assert!(normalize_album(&raw).is_none());
        // Releases fall back to "Various Artists"
        let release = normalize_album_release(&raw).unwrap();
        assert_eq!(release.artist_name, "Various Artists");
    }

    #[test]
    fn test_playlist_subtitle_fallbacks() {
        let mut raw = dto::Playlist {
            id: Some(RawId::Number(5)),
            title: Some("Hits".to_string()),
            description: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(normalize_playlist_summary(&raw).unwrap().subtitle, "By Deezer");

        raw.user = Some(dto::UserRef {
            id: None,
            name: Some("Editor".to_string()),
        });
        assert_eq!(normalize_playlist_summary(&raw).unwrap().subtitle, "By Editor");

        raw.description = Some("Fresh picks".to_string());
        assert_eq!(normalize_playlist_summary(&raw).unwrap().subtitle, "Fresh picks");
    }

    #[test]
    fn test_playlist_detail_skips_bad_tracks() {
        let raw: dto::PlaylistDetail = serde_json::from_str(
            r#"{
                "id": 42, "title": "Mix", "duration": 3725,
                "tracks": {"data": [
                    {"id": 1, "title": "Good", "artist": {"name": "A"}, "album": {}},
                    {"id": 2, "title": "No album", "artist": {"name": "A"}},
                    "not an object"
                ]}
            }"#,
        )
        .unwrap();

        let detail = to_playlist_detail(&raw).unwrap();
        assert_eq!(detail.tracks.len(), 1);
        assert_eq!(detail.tracks[0].title, "Good");
        assert_eq!(detail.duration_total_formatted, "62:05");
        assert_eq!(detail.creator_name, "Deezer");
    }
}
