//! The user's library: cached songs, likes and playlists.
//!
//! - [`resolver`] turns catalog track ids into cached [`crate::model::Song`] rows
//! - [`likes`] stamps liked flags and toggles likes
//! - [`playlists`] owns playlist membership and derived covers

pub mod likes;
pub mod playlists;
pub mod resolver;

pub use likes::{LikeAction, LikeError, LikeOutcome, Likeable, TrackRecord, annotate};
pub use playlists::{
    CoverChange, MutationResult, PlaylistError, PlaylistMutation, PlaylistService,
    UserPlaylistDetail,
};
pub use resolver::{ResolutionError, SongResolver};
