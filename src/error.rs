//! Error types for the bucket-listing library.

use thiserror::Error;

/// Errors that can occur while loading a bucket listing.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error, including non-success status codes.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A listing page could not be understood.
    #[error("Listing parse failed: {0}")]
    Listing(String),

    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration or serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for bucket-listing operations.
pub type Result<T> = std::result::Result<T, Error>;
