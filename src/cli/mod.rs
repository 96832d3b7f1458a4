//! Command-line interface for tunedeck.
//!
//! This module provides CLI commands for browsing the catalog, searching,
//! liking songs and managing playlists.

mod commands;

pub use commands::{ChartKind, Cli, Commands, ConfigAction, PlaylistAction, run_command};
