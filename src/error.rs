//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum aggregating the module errors
//! - [`FailureKind`]: Machine-readable classification handed to callers
//!   together with a generic message; internal details stay in the logs
//! - Module-specific errors (e.g., [`ResolutionError`]) for detailed handling

use serde::Serialize;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::library::{LikeError, PlaylistError, ResolutionError};
use crate::search::SearchFailure;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transport failure, timeout or non-success HTTP status
    NetworkError,
    /// Body was not decodable JSON
    InvalidResponse,
    /// Catalog reported an error or a not-found sentinel
    CatalogError,
    /// Payload decoded but had an unexpected shape
    MalformedPayload,
    /// Required fields missing after normalization
    IncompleteData,
    /// Resource missing, or not owned by the caller
    NotFound,
    /// Caller may not touch the resource
    Forbidden,
    /// Precondition violation (e.g. empty identifier)
    InvalidInput,
    /// Local store failure
    StorageError,
}

impl FailureKind {
    /// Stable snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NetworkError => "network_error",
            FailureKind::InvalidResponse => "invalid_response",
            FailureKind::CatalogError => "catalog_error",
            FailureKind::MalformedPayload => "malformed_payload",
            FailureKind::IncompleteData => "incomplete_data",
            FailureKind::NotFound => "not_found",
            FailureKind::Forbidden => "forbidden",
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::StorageError => "storage_error",
        }
    }

    /// Generic, non-leaking message suitable for end users.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::NetworkError => "The music catalog could not be reached. Please try again.",
            FailureKind::InvalidResponse | FailureKind::MalformedPayload => {
                "The music catalog returned an unexpected response."
            }
            FailureKind::CatalogError => "The music catalog could not provide this item.",
            FailureKind::IncompleteData => "The catalog data for this item is incomplete.",
            FailureKind::NotFound | FailureKind::Forbidden => "The requested item was not found.",
            FailureKind::InvalidInput => "The request was missing required information.",
            FailureKind::StorageError => "An internal error occurred. Please try again.",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog call failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Song could not be resolved
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Playlist operation failed
    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    /// Search failed
    #[error("Search error: {0}")]
    Search(#[from] SearchFailure),

    /// Like toggle failed
    #[error("Like error: {0}")]
    Like(#[from] LikeError),

    /// Config file could not be written
    #[error("Config file error: {0}")]
    ConfigFile(#[from] ConfigError),

    /// Precondition violation
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Machine-readable failure kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Database(_) | Error::ConfigFile(_) => FailureKind::StorageError,
            Error::InvalidInput(_) => FailureKind::InvalidInput,
            Error::Catalog(e) => e.kind(),
            Error::Resolution(e) => e.kind(),
            Error::Playlist(e) => e.kind(),
            Error::Search(e) => e.kind(),
            Error::Like(e) => e.kind(),
            Error::WithContext { source, .. } => source.kind(),
        }
    }

    /// Generic, non-leaking message for end users.
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
