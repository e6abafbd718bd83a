//! Wire models for the radio service REST API
//!
//! The service speaks JSON with camelCase keys. Tracks arrive in station
//! playlist fragments; each carries a short-lived `audioURL` that must be
//! played promptly and never cached to disk.

use serde::{Deserialize, Serialize};

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(rename = "listenerId", default)]
    pub listener_id: Option<String>,
}

/// Artwork at one resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Art {
    pub url: String,
    #[serde(default)]
    pub size: Option<u32>,
}

/// A radio station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "stationId")]
    pub station_id: String,
    pub name: String,
    #[serde(default)]
    pub art: Vec<Art>,
}

/// Response of `POST /station/getStations`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub stations: Vec<Station>,
}

/// A track inside a playlist fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentTrack {
    #[serde(rename = "trackToken")]
    pub track_token: String,
    #[serde(rename = "songTitle")]
    pub song_title: String,
    #[serde(rename = "artistName")]
    pub artist_name: String,
    #[serde(rename = "albumTitle", default)]
    pub album_title: Option<String>,
    /// Length in seconds
    #[serde(rename = "trackLength", default)]
    pub track_length: Option<u32>,
    /// Short-lived playable URL, valid for this play only
    #[serde(rename = "audioURL", default)]
    pub audio_url: Option<String>,
    #[serde(rename = "albumArt", default)]
    pub album_art: Vec<Art>,
}

/// Response of `POST /playlist/getFragment`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FragmentResponse {
    #[serde(default)]
    pub tracks: Vec<FragmentTrack>,
}

/// Response of `POST /playlist/getTrackAudio`
#[derive(Debug, Clone, Deserialize)]
pub struct TrackAudioResponse {
    #[serde(rename = "audioURL")]
    pub audio_url: String,
}

/// Picks the largest artwork by declared size
pub(crate) fn best_art(art: &[Art]) -> Option<&str> {
    art.iter()
        .max_by_key(|a| a.size.unwrap_or(0))
        .map(|a| a.url.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_track_deserializes() {
        let json = r#"{
            "trackToken": "tok123",
            "songTitle": "Song",
            "artistName": "Artist",
            "albumTitle": "Album",
            "trackLength": 241,
            "audioURL": "https://audio.example/t.m4a?exp=1",
            "albumArt": [
                {"url": "https://art.example/90.jpg", "size": 90},
                {"url": "https://art.example/500.jpg", "size": 500}
            ]
        }"#;
        let track: FragmentTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.track_token, "tok123");
        assert_eq!(track.track_length, Some(241));
        assert_eq!(best_art(&track.album_art), Some("https://art.example/500.jpg"));
    }

    #[test]
    fn sparse_fragment_track_deserializes() {
        let track: FragmentTrack = serde_json::from_str(
            r#"{"trackToken": "t", "songTitle": "S", "artistName": "A"}"#,
        )
        .unwrap();
        assert!(track.audio_url.is_none());
        assert!(track.album_art.is_empty());
    }

    #[test]
    fn empty_stations_response_is_valid() {
        let response: StationsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.stations.is_empty());
    }
}
