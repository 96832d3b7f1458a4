//! Tunedeck - music discovery and playlisting on top of the Deezer catalog.
//!
//! Charts, search and detail pages come straight from the catalog. Songs a
//! user interacts with (likes, playlist additions) are cached locally in
//! SQLite on first use and never refreshed afterwards.
//!
//! The view layer talks to [`service::MusicService`]; the `tunedeck` binary
//! exposes the same operations as CLI subcommands.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod model;
pub mod search;
pub mod service;
#[cfg(test)]
pub mod test_utils;

pub use error::{Error, FailureKind, Result};
pub use service::MusicService;
