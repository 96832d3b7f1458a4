//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `browse`: Charts, releases, search and catalog detail pages
//! - `songs`: Song resolution, previews and likes
//! - `playlists`: User playlist management
//! - `settings`: Config file inspection and creation

mod browse;
mod playlists;
mod settings;
mod songs;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::error::Error;
use crate::model::{PlaylistId, UserId};
use crate::service::MusicService;

pub use browse::{cmd_artist, cmd_charts, cmd_playlist, cmd_releases, cmd_search};
pub use playlists::cmd_playlists;
pub use settings::cmd_config;
pub use songs::{cmd_like, cmd_liked, cmd_preview, cmd_resolve};

/// Tunedeck CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database path (overrides the config file)
    #[arg(long, global = true, env = "TUNEDECK_DB")]
    pub db: Option<PathBuf>,

    /// Catalog API root (overrides the config file)
    #[arg(long, global = true, env = "TUNEDECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TUNEDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Acting user id (needed for likes and playlists)
    #[arg(short, long, global = true, env = "TUNEDECK_USER")]
    pub user: Option<UserId>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which chart to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    Tracks,
    Artists,
    Playlists,
    All,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the catalog charts
    Charts {
        /// Which chart to show
        #[arg(value_enum, default_value = "all")]
        kind: ChartKind,
        /// Number of entries (defaults to the configured limits)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show editorial new releases
    Releases {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Search tracks, artists and albums
    Search {
        /// Search terms
        query: String,
        /// Put the top track's artist first and skip albums
        #[arg(short, long)]
        interactive: bool,
    },
    /// Show an artist profile with top tracks
    Artist {
        /// Catalog artist id
        id: String,
    },
    /// Show a catalog playlist with its tracks
    Playlist {
        /// Catalog playlist id
        id: String,
    },
    /// Cache a track locally and print the stored song
    Resolve {
        /// Catalog track id
        id: String,
    },
    /// Fetch a fresh preview URL for a track
    Preview {
        /// Catalog track id
        id: String,
    },
    /// Like a track, or unlike it if already liked
    Like {
        /// Catalog track id
        id: String,
    },
    /// List liked songs
    Liked,
    /// Manage your playlists
    Playlists {
        #[command(subcommand)]
        action: PlaylistAction,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Playlist subcommands
#[derive(Subcommand)]
pub enum PlaylistAction {
    /// Create an empty playlist
    Create {
        /// Playlist name
        name: String,
    },
    /// List your playlists (newest first)
    List {
        /// Sort by name instead, as shown in "add to playlist" pickers
        #[arg(long)]
        by_name: bool,
    },
    /// Show a playlist and its songs
    Show { playlist_id: PlaylistId },
    /// Add a track to a playlist
    Add {
        playlist_id: PlaylistId,
        /// Catalog track id
        track_id: String,
    },
    /// Remove a track from a playlist
    Remove {
        playlist_id: PlaylistId,
        /// Catalog track id
        track_id: String,
    },
    /// Add a track to several playlists at once
    AddMany {
        /// Catalog track id
        track_id: String,
        /// Target playlist ids
        playlist_ids: Vec<PlaylistId>,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = effective_config(cli);

    if let Commands::Config { action } = &cli.command {
        return cmd_config(action, &config, cli.config.as_deref());
    }

    let rt = Runtime::new()?;
    let service = connect(&rt, &config)?;

    match &cli.command {
        Commands::Charts { kind, limit } => cmd_charts(&rt, &service, cli.user, *kind, *limit),
        Commands::Releases { limit } => cmd_releases(&rt, &service, *limit),
        Commands::Search { query, interactive } => {
            cmd_search(&rt, &service, cli.user, query, *interactive)
        }
        Commands::Artist { id } => cmd_artist(&rt, &service, cli.user, id),
        Commands::Playlist { id } => cmd_playlist(&rt, &service, cli.user, id),
        Commands::Resolve { id } => cmd_resolve(&rt, &service, id),
        Commands::Preview { id } => cmd_preview(&rt, &service, id),
        Commands::Like { id } => cmd_like(&rt, &service, require_user(cli)?, id),
        Commands::Liked => cmd_liked(&rt, &service, require_user(cli)?),
        Commands::Playlists { action } => cmd_playlists(&rt, &service, require_user(cli)?, action),
        Commands::Config { .. } => Ok(()),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the config file and apply command-line overrides
fn effective_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.catalog.base_url = base_url.clone();
    }
    config
}

fn connect(rt: &Runtime, config: &Config) -> anyhow::Result<MusicService> {
    rt.block_on(MusicService::connect(config)).map_err(report)
}

fn require_user(cli: &Cli) -> anyhow::Result<UserId> {
    cli.user
        .ok_or_else(|| anyhow::anyhow!("This command needs a user id (--user or TUNEDECK_USER)"))
}

/// Turn a library error into the generic message users see.
///
/// Details go to the log only.
pub(crate) fn report(err: impl Into<Error>) -> anyhow::Error {
    let err = err.into();
    tracing::debug!(error = %err, "Command failed");
    anyhow::anyhow!("{} ({})", err.user_message(), err.kind())
}
