//! Common error types for Soundclash

use thiserror::Error;

/// Common result type for Soundclash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Soundclash service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found, or in the wrong state for the operation
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing, invalid, or expired admin credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A vote for this match already exists for this voter in the current round
    #[error("Already voted on this match")]
    AlreadyVoted,

    /// No match with the given id exists in the current round
    #[error("Match not found in the current round")]
    MatchNotFound,

    /// External catalog lookup failed or returned nothing usable
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
