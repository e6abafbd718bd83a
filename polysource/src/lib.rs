//! # PolySource
//!
//! Common traits and types for Polyphon music sources.
//!
//! This crate provides the foundational abstractions shared by every backend
//! in the Polyphon hub (the video-platform music catalog, the licensed radio
//! service, and any future catalog):
//!
//! - **Composite ids**: the `"{tag}:{native_id}"` addressing scheme
//!   ([`SourceId`], [`SourceTag`]).
//! - **Canonical records**: [`CanonicalTrack`], [`CanonicalAlbum`],
//!   [`CanonicalPlaylist`] — the only shapes that cross the source boundary.
//! - **Capability-based trait**: [`MusicSource`], where every operation a
//!   backend does not implement defaults to a typed "unsupported" error so
//!   aggregate callers can skip it instead of failing.
//! - **Aggregation**: [`SourceManager`] fans multi-source operations out and
//!   dispatches single-source operations by tag; [`ManagerRegistry`] caches
//!   assembled managers per session.
//!
//! ## Implementing a source
//!
//! ```rust,ignore
//! use polysource::{async_trait, MusicSource, SourceTag, Result, SearchResults};
//!
//! #[derive(Debug)]
//! struct MyCatalog;
//!
//! #[async_trait]
//! impl MusicSource for MyCatalog {
//!     fn tag(&self) -> SourceTag { SourceTag::YtMusic }
//!     fn name(&self) -> &str { "My Catalog" }
//!     fn supports_search(&self) -> bool { true }
//!     async fn search(&self, query: &str) -> Result<SearchResults> {
//!         // translate the backend's native shapes into canonical records
//!         Ok(SearchResults::default())
//!     }
//! }
//! ```

pub mod id;
pub mod manager;
pub mod registry;

pub use async_trait::async_trait;
pub use id::{SourceId, SourceTag, UnknownSourceTag};
pub use manager::SourceManager;
pub use registry::{ManagerFactory, ManagerRegistry, Session};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Error types for music source operations
#[derive(Debug, thiserror::Error)]
pub enum MusicSourceError {
    #[error("Search not supported")]
    SearchNotSupported,

    #[error("Feature not supported: {0}")]
    NotSupported(String),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Source not available: {0}")]
    SourceUnavailable(String),

    #[error("No source registered for tag '{0}'")]
    NoSourceForTag(SourceTag),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

impl MusicSourceError {
    /// Creates a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type for music source operations
pub type Result<T> = std::result::Result<T, MusicSourceError>;

/// A track in canonical form
///
/// Every source translates its backend's native response shape into this
/// record before returning; no backend-specific shape crosses the source
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTrack {
    /// Composite id, `"{tag}:{native_id}"`
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Duration in seconds, when the backend reports one
    pub duration_secs: Option<u32>,
    pub source: SourceId,
    pub artwork_url: Option<String>,
}

impl CanonicalTrack {
    /// Builds a track, deriving the composite `id` from the source pair
    pub fn new(source: SourceId, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: source.encode(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration_secs: None,
            source,
            artwork_url: None,
        }
    }
}

/// An album in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAlbum {
    /// Composite id of the album on its backend
    pub id: String,
    pub title: String,
    pub artist: String,
    pub source: SourceId,
    pub track_count: Option<u32>,
    pub artwork_url: Option<String>,
}

/// A playlist (or radio station) in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPlaylist {
    /// Composite id of the playlist on its backend
    pub id: String,
    pub title: String,
    pub source: SourceId,
    pub track_count: Option<u32>,
    pub artwork_url: Option<String>,
}

/// Result of a search operation across one source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub tracks: Vec<CanonicalTrack>,
    pub albums: Vec<CanonicalAlbum>,
}

impl SearchResults {
    /// Absorbs another result set (used by the multi-source fan-out)
    pub fn merge(&mut self, other: SearchResults) {
        self.tracks.extend(other.tracks);
        self.albums.extend(other.albums);
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.albums.is_empty()
    }
}

/// Main trait for music sources
///
/// A concrete backend implements any non-empty subset of the capability set
/// `{search, playlists, streaming}`. Capability presence is explicit and
/// compiler-checked: each operation has a `supports_*` flag and a default
/// body returning a typed "unsupported" error. Callers must treat an absent
/// capability as "exclude this source from the operation", never as a hard
/// failure of the aggregate call.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use in async servers.
#[async_trait]
pub trait MusicSource: Debug + Send + Sync {
    /// Returns the tag this source is registered under
    fn tag(&self) -> SourceTag;

    /// Returns the human-readable name of the source
    fn name(&self) -> &str;

    // ============= Search =============

    /// Whether this source participates in multi-source search
    fn supports_search(&self) -> bool {
        false
    }

    /// Full-text search over the backend's catalog
    async fn search(&self, _query: &str) -> Result<SearchResults> {
        Err(MusicSourceError::SearchNotSupported)
    }

    // ============= Playlists / albums =============

    /// Whether this source exposes playlists (or radio stations)
    fn supports_playlists(&self) -> bool {
        false
    }

    /// Lists the playlists available on this source
    async fn list_playlists(&self) -> Result<Vec<CanonicalPlaylist>> {
        Err(MusicSourceError::NotSupported("playlists".into()))
    }

    /// Returns the tracks of one playlist, by native playlist id
    async fn playlist_tracks(&self, _playlist_id: &str) -> Result<Vec<CanonicalTrack>> {
        Err(MusicSourceError::NotSupported("playlists".into()))
    }

    /// Returns the tracks of one album, by native album id
    async fn album_tracks(&self, _album_id: &str) -> Result<Vec<CanonicalTrack>> {
        Err(MusicSourceError::NotSupported("albums".into()))
    }

    // ============= Playback =============

    /// Whether this source can resolve playable URLs
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Resolves a native track id to a playable URL
    async fn stream_url(&self, _native_id: &str) -> Result<String> {
        Err(MusicSourceError::NotSupported("streaming".into()))
    }
}
