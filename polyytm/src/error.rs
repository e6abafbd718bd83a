//! Error types for the catalog proxy client

use polysource::MusicSourceError;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, YtmError>;

#[derive(Debug, thiserror::Error)]
pub enum YtmError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API answered with a non-success status
    #[error("API returned status {0}")]
    Api(u16),

    /// Track (or playlist, album) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<YtmError> for MusicSourceError {
    fn from(e: YtmError) -> Self {
        match e {
            YtmError::NotFound(what) => MusicSourceError::TrackNotFound(what),
            other => MusicSourceError::SourceUnavailable(other.to_string()),
        }
    }
}
