//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tunedeck\config.toml
//! - macOS: ~/Library/Application Support/tunedeck/config.toml
//! - Linux: ~/.config/tunedeck/config.toml
//!
//! The config file is human-readable and editable. Command-line flags
//! override individual values after loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::SearchLimits;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API settings
    pub catalog: CatalogConfig,

    /// Local store settings
    pub database: DatabaseConfig,

    /// Listing and search sizes
    pub limits: LimitsConfig,
}

/// Catalog API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// API root, without trailing slash
    pub base_url: String,

    /// Timeout for ordinary lookups, in seconds
    pub timeout_secs: u64,

    /// Timeout for search and playlist detail, in seconds
    pub search_timeout_secs: u64,

    /// Override for the User-Agent header
    pub user_agent: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deezer.com".to_string(),
            timeout_secs: 10,
            search_timeout_secs: 15,
            user_agent: None,
        }
    }
}

/// Local store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(crate::db::DEFAULT_DB_NAME),
        }
    }
}

/// Listing and search sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub top_artists: usize,
    pub top_tracks: usize,
    pub top_playlists: usize,
    pub new_releases: usize,
    pub search_tracks: usize,
    pub search_artists: usize,
    pub search_albums: usize,
    /// Artist slots shown by the interactive search
    pub interactive_artists: usize,
    pub artist_top_tracks: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            top_artists: 10,
            top_tracks: 10,
            top_playlists: 8,
            new_releases: 24,
            search_tracks: 10,
            search_artists: 6,
            search_albums: 6,
            interactive_artists: 5,
            artist_top_tracks: 10,
        }
    }
}

impl LimitsConfig {
    /// Bucket limits for a full search.
    pub fn search(&self) -> SearchLimits {
        SearchLimits::new(self.search_tracks, self.search_artists, self.search_albums)
    }

    /// Bucket limits for the interactive search (no albums).
    pub fn interactive_search(&self) -> SearchLimits {
        SearchLimits::new(self.search_tracks, self.interactive_artists, 0)
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunedeck"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit file
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to an explicit file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
