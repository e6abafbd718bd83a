//! HTTP client for the catalog proxy API

use crate::error::{Result, YtmError};
use crate::models::{
    PlaylistsResponse, SearchResponse, StreamResponse, TracksResponse, WireAlbum, WirePlaylist,
    WireSong,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for metadata requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "polyytm/0.1.0";

/// Client for the self-hosted catalog proxy.
///
/// The proxy wraps the upstream music service behind a small JSON API:
/// search, album and playlist track listings, and per-track stream URL
/// resolution.
///
/// # Example
///
/// ```no_run
/// use polyytm::YtMusicClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = YtMusicClient::builder()
///         .api_base("https://music.example-proxy.net/api/v1")
///         .build()?;
///     let results = client.search("daft punk").await?;
///     println!("{} tracks", results.tracks.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct YtMusicClient {
    client: Client,
    api_base: String,
}

impl YtMusicClient {
    /// Creates a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Creates a client from the global configuration
    pub fn from_config() -> Result<Self> {
        let config = polyconfig::get_config();
        Self::builder().api_base(config.get_ytm_api_base()).build()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path
        ))?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "Catalog API request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(YtmError::NotFound(
                response.url().path().trim_start_matches('/').to_string(),
            ));
        }
        if !status.is_success() {
            return Err(YtmError::Api(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Full-text search over the catalog
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let mut url = self.endpoint("search")?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url).await
    }

    /// Lists the tracks of an album by browse id
    pub async fn album_tracks(&self, browse_id: &str) -> Result<Vec<WireSong>> {
        let url = self.endpoint(&format!("albums/{browse_id}/tracks"))?;
        let response: TracksResponse = self.get_json(url).await?;
        Ok(response.tracks)
    }

    /// Lists the library playlists
    pub async fn playlists(&self) -> Result<Vec<WirePlaylist>> {
        let url = self.endpoint("playlists")?;
        let response: PlaylistsResponse = self.get_json(url).await?;
        Ok(response.playlists)
    }

    /// Lists the tracks of a playlist
    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<WireSong>> {
        let url = self.endpoint(&format!("playlists/{playlist_id}/tracks"))?;
        let response: TracksResponse = self.get_json(url).await?;
        Ok(response.tracks)
    }

    /// Resolves a video id to a direct audio URL
    pub async fn stream_url(&self, video_id: &str) -> Result<String> {
        let url = self.endpoint(&format!("streams/{video_id}"))?;
        let response: StreamResponse = self.get_json(url).await?;
        Ok(response.url)
    }

    /// Lists the albums found by a search (convenience)
    pub async fn search_albums(&self, query: &str) -> Result<Vec<WireAlbum>> {
        Ok(self.search(query).await?.albums)
    }
}

/// Builder for configuring a [`YtMusicClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    request_timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: String::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom HTTP client, sharing its connection pool
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the proxy API base URL (required)
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Sets the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<YtMusicClient> {
        if self.api_base.is_empty() {
            return Err(YtmError::Other("API base URL is not configured".into()));
        }
        Url::parse(&self.api_base)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.request_timeout)
                .build()?,
        };

        Ok(YtMusicClient {
            client,
            api_base: self.api_base,
        })
    }
}
