//! Error types for the radio service client

use polysource::MusicSourceError;

/// Result type alias for radio service operations
pub type Result<T> = std::result::Result<T, PandoraError>;

#[derive(Debug, thiserror::Error)]
pub enum PandoraError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Login rejected or auth token expired
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The API answered with a non-success status
    #[error("API returned status {0}")]
    Api(u16),

    /// Station or track not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<PandoraError> for MusicSourceError {
    fn from(e: PandoraError) -> Self {
        match e {
            PandoraError::Auth(msg) => MusicSourceError::Auth(msg),
            PandoraError::NotFound(what) => MusicSourceError::TrackNotFound(what),
            other => MusicSourceError::SourceUnavailable(other.to_string()),
        }
    }
}
