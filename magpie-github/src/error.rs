//! Error types for extraction and traversal

use thiserror::Error;

/// Result type for extraction and traversal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or traversing artifacts
#[derive(Error, Debug)]
pub enum Error {
    /// URL is not a recognized GitHub issue or pull request URL
    #[error("not a GitHub issue or pull request URL: {0}")]
    InvalidUrl(String),

    /// Extraction service rejected the request due to rate limiting
    #[error("extraction rate limited: {0}")]
    RateLimited(String),

    /// Extraction service rejected the credentials
    #[error("extraction permission denied: {0}")]
    PermissionDenied(String),

    /// Artifact does not exist upstream
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// Extraction service failed
    #[error("extraction service error: {0}")]
    Extraction(String),

    /// Raw diff retrieval returned a non-success status
    #[error("diff fetch for {url} failed with status {status}")]
    DiffFetch { url: String, status: u16 },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response could not be parsed into the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the retry policy may transparently re-attempt after this error
    ///
    /// Rate limits, service-side failures, and transport errors are
    /// transient; everything else fails fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimited(_) | Error::Extraction(_) => true,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
