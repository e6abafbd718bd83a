//! `MusicSource` implementation for the catalog backend
//!
//! Converts the proxy's wire models into canonical records. This source
//! carries the full capability set: search, playlists, albums, streaming.

use crate::client::YtMusicClient;
use crate::models::{WireAlbum, WirePlaylist, WireSong, best_thumbnail, join_artists};
use polysource::{
    CanonicalAlbum, CanonicalPlaylist, CanonicalTrack, MusicSource, Result, SearchResults,
    SourceId, SourceTag, async_trait,
};

const TAG: SourceTag = SourceTag::YtMusic;

#[derive(Debug)]
pub struct YtMusicSource {
    client: YtMusicClient,
}

impl YtMusicSource {
    pub fn new(client: YtMusicClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &YtMusicClient {
        &self.client
    }
}

#[async_trait]
impl MusicSource for YtMusicSource {
    fn tag(&self) -> SourceTag {
        TAG
    }

    fn name(&self) -> &str {
        "YouTube Music"
    }

    fn supports_search(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        let response = self.client.search(query).await?;
        Ok(SearchResults {
            tracks: response.tracks.iter().map(track_from_wire).collect(),
            albums: response.albums.iter().map(album_from_wire).collect(),
        })
    }

    fn supports_playlists(&self) -> bool {
        true
    }

    async fn list_playlists(&self) -> Result<Vec<CanonicalPlaylist>> {
        let playlists = self.client.playlists().await?;
        Ok(playlists.iter().map(playlist_from_wire).collect())
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<CanonicalTrack>> {
        let tracks = self.client.playlist_tracks(playlist_id).await?;
        Ok(tracks.iter().map(track_from_wire).collect())
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<CanonicalTrack>> {
        let tracks = self.client.album_tracks(album_id).await?;
        Ok(tracks.iter().map(track_from_wire).collect())
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn stream_url(&self, native_id: &str) -> Result<String> {
        Ok(self.client.stream_url(native_id).await?)
    }
}

fn track_from_wire(song: &WireSong) -> CanonicalTrack {
    let source = SourceId::new(TAG, &song.video_id);
    CanonicalTrack {
        id: source.encode(),
        title: song.title.clone(),
        artist: join_artists(&song.artists),
        album: song.album.as_ref().map(|a| a.name.clone()),
        duration_secs: song.duration_seconds,
        source,
        artwork_url: best_thumbnail(&song.thumbnails).map(str::to_string),
    }
}

fn album_from_wire(album: &WireAlbum) -> CanonicalAlbum {
    let source = SourceId::new(TAG, &album.browse_id);
    CanonicalAlbum {
        id: source.encode(),
        title: album.title.clone(),
        artist: join_artists(&album.artists),
        source,
        track_count: album.track_count,
        artwork_url: best_thumbnail(&album.thumbnails).map(str::to_string),
    }
}

fn playlist_from_wire(playlist: &WirePlaylist) -> CanonicalPlaylist {
    let source = SourceId::new(TAG, &playlist.playlist_id);
    CanonicalPlaylist {
        id: source.encode(),
        title: playlist.title.clone(),
        source,
        track_count: playlist.track_count,
        artwork_url: best_thumbnail(&playlist.thumbnails).map(str::to_string),
    }
}
