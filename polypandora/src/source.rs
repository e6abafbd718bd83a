//! `MusicSource` implementation for the radio backend
//!
//! Stations surface as playlists; a station's current playlist fragment
//! surfaces as its tracks. No search capability: the service has no
//! browsable catalog, so the multi-source search simply skips this source.

use crate::client::PandoraClient;
use crate::models::{FragmentTrack, Station, best_art};
use polysource::{
    CanonicalPlaylist, CanonicalTrack, MusicSource, Result, SourceId, SourceTag, async_trait,
};

const TAG: SourceTag = SourceTag::Pandora;

#[derive(Debug)]
pub struct PandoraSource {
    client: PandoraClient,
}

impl PandoraSource {
    pub fn new(client: PandoraClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PandoraClient {
        &self.client
    }
}

#[async_trait]
impl MusicSource for PandoraSource {
    fn tag(&self) -> SourceTag {
        TAG
    }

    fn name(&self) -> &str {
        "Pandora"
    }

    fn supports_playlists(&self) -> bool {
        true
    }

    async fn list_playlists(&self) -> Result<Vec<CanonicalPlaylist>> {
        let stations = self.client.stations().await?;
        Ok(stations.iter().map(playlist_from_station).collect())
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<CanonicalTrack>> {
        let tracks = self.client.station_fragment(playlist_id).await?;
        Ok(tracks.iter().map(track_from_fragment).collect())
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn stream_url(&self, native_id: &str) -> Result<String> {
        Ok(self.client.track_audio(native_id).await?)
    }
}

fn playlist_from_station(station: &Station) -> CanonicalPlaylist {
    let source = SourceId::new(TAG, &station.station_id);
    CanonicalPlaylist {
        id: source.encode(),
        title: station.name.clone(),
        source,
        // Fragments are open-ended, a station has no track count
        track_count: None,
        artwork_url: best_art(&station.art).map(str::to_string),
    }
}

fn track_from_fragment(track: &FragmentTrack) -> CanonicalTrack {
    let source = SourceId::new(TAG, &track.track_token);
    CanonicalTrack {
        id: source.encode(),
        title: track.song_title.clone(),
        artist: track.artist_name.clone(),
        album: track.album_title.clone(),
        duration_secs: track.track_length,
        source,
        artwork_url: best_art(&track.album_art).map(str::to_string),
    }
}
