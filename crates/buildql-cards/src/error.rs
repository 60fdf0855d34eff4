//! Error types for card search.

use buildql::{ConfigError, QueryError};
use thiserror::Error;

/// Errors that can occur when loading a catalog or running a search.
#[derive(Debug, Error)]
pub enum Error {
    /// The query failed to parse, compile or evaluate.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("failed to parse card catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    /// The engine configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A specialized Result type for card search.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if the error is a problem with the query text rather
    /// than with the data it ran against.
    pub fn is_query_error(&self) -> bool {
        matches!(self, Error::Query(err) if err.is_query_fatal())
    }
}
