//! Wire models for the catalog proxy API
//!
//! These mirror the proxy's JSON shapes verbatim; they never leave this
//! crate. The source layer converts them into canonical records.

use serde::{Deserialize, Deserializer, Serialize};

/// Flexible deserializer for ids the API sometimes sends as numbers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::custom("ID must be a string or number")),
    }
}

/// An artist credit on a song or album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireArtist {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// A thumbnail at one resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireThumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Reference to the album a song belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAlbumRef {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// A song as returned by search, album, and playlist endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSong {
    #[serde(rename = "videoId", deserialize_with = "deserialize_id")]
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<WireArtist>,
    #[serde(default)]
    pub album: Option<WireAlbumRef>,
    #[serde(rename = "durationSeconds", default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub thumbnails: Vec<WireThumbnail>,
}

/// An album as returned by the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAlbum {
    #[serde(rename = "browseId", deserialize_with = "deserialize_id")]
    pub browse_id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<WireArtist>,
    #[serde(rename = "trackCount", default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub thumbnails: Vec<WireThumbnail>,
}

/// A playlist from the user's library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirePlaylist {
    #[serde(rename = "playlistId", deserialize_with = "deserialize_id")]
    pub playlist_id: String,
    pub title: String,
    #[serde(rename = "trackCount", default)]
    pub track_count: Option<u32>,
    #[serde(default)]
    pub thumbnails: Vec<WireThumbnail>,
}

/// Response of `GET /search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Vec<WireSong>,
    #[serde(default)]
    pub albums: Vec<WireAlbum>,
}

/// Response of track-listing endpoints (albums, playlists)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<WireSong>,
}

/// Response of `GET /playlists`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<WirePlaylist>,
}

/// Response of `GET /streams/{videoId}`
#[derive(Debug, Clone, Deserialize)]
pub struct StreamResponse {
    /// Direct audio URL; typically valid for a few hours
    pub url: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

/// Joins the artist credits into one display string
pub(crate) fn join_artists(artists: &[WireArtist]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Picks the largest thumbnail by area
pub(crate) fn best_thumbnail(thumbnails: &[WireThumbnail]) -> Option<&str> {
    thumbnails
        .iter()
        .max_by_key(|t| u64::from(t.width.unwrap_or(0)) * u64::from(t.height.unwrap_or(0)))
        .map(|t| t.url.as_str())
}
