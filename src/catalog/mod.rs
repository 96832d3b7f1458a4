//! Catalog module - read-only access to the Deezer public API.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **API DTOs** (`dto.rs`) - Exact API response shapes, every field optional
//! - **Domain models** (`domain.rs`) - Normalized records handed to callers
//! - **Adapter** (`adapter.rs`) - Converts DTOs to domain models, dropping
//!   records that miss required fields
//! - **Client** (`client.rs`) - HTTP client with per-call timeouts
//! - **Traits** (`traits.rs`) - [`CatalogApi`] seam for dependency injection
//!
//! The client never caches. Tracks are cached by [`crate::library::SongResolver`].
//!
//! # Usage
//!
//! ```ignore
//! use tunedeck::catalog::{CatalogClient, adapter};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let raw = client.top_tracks(10).await?;
//! let tracks: Vec<_> = raw.iter().filter_map(adapter::normalize_track).collect();
//! ```

pub mod adapter;
pub mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use client::CatalogClient;
pub use domain::{
    Album, AlbumRelease, Artist, ArtistDetail, CatalogError, PlaylistDetail, PlaylistSummary,
    SearchLimits, SearchResults, Track,
};
pub use traits::CatalogApi;
