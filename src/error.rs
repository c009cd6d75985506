//! Error types for Ecomdesk
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Ecomdesk operations
///
/// Covers configuration loading, backend calls, local session storage,
/// and client-side validation of user input.
#[derive(Error, Debug)]
pub enum EcomdeskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered with a non-success HTTP status
    #[error("Backend returned {status}: {message}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body or short description
        message: String,
    },

    /// The backend could not be reached or its response could not be read
    #[error("Connection error: {0}")]
    Connection(String),

    /// Client-side input validation failed before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A reviewer operation was attempted without credentials
    #[error("Reviewer is not signed in")]
    NotSignedIn,

    /// An operation needed an active case but none is set
    #[error("No active case for this session")]
    NoActiveCase,

    /// Uploaded file is not an accepted image type
    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    /// Local session storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite errors from the durable session store
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Ecomdesk operations
///
/// Uses `anyhow::Error` so call sites can attach context while still
/// allowing callers to downcast to [`EcomdeskError`].
pub type Result<T> = anyhow::Result<T>;
