use polysource::MusicSource;
use polyytm::{YtMusicClient, YtMusicSource, YtmError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> YtMusicClient {
    YtMusicClient::builder()
        .api_base(format!("{}/api/v1", server.uri()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn search_parses_tracks_and_albums() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "daft punk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [{
                "videoId": "vid1",
                "title": "One More Time",
                "artists": [{"name": "Daft Punk"}],
                "durationSeconds": 320
            }],
            "albums": [{
                "browseId": "MPREb_disc",
                "title": "Discovery",
                "artists": [{"name": "Daft Punk"}],
                "trackCount": 14
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let results = client.search("daft punk").await.unwrap();
    assert_eq!(results.tracks.len(), 1);
    assert_eq!(results.tracks[0].video_id, "vid1");
    assert_eq!(results.albums.len(), 1);
    assert_eq!(results.albums[0].track_count, Some(14));
}

#[tokio::test]
async fn stream_url_resolves() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/streams/vid1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://cdn.example/audio/vid1.webm",
            "mimeType": "audio/webm"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let url = client.stream_url("vid1").await.unwrap();
    assert_eq!(url, "https://cdn.example/audio/vid1.webm");
}

#[tokio::test]
async fn missing_track_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/streams/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.stream_url("ghost").await.unwrap_err();
    assert!(matches!(err, YtmError::NotFound(_)));
}

#[tokio::test]
async fn server_error_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/playlists"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.playlists().await.unwrap_err();
    assert!(matches!(err, YtmError::Api(503)));
}

#[tokio::test]
async fn source_returns_canonical_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playlists": [{"playlistId": "PL1", "title": "Favorites", "trackCount": 3}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/playlists/PL1/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [{
                "videoId": "vidA",
                "title": "Track A",
                "artists": [{"name": "Someone"}]
            }]
        })))
        .mount(&server)
        .await;

    let source = YtMusicSource::new(client_for(&server).await);
    let playlists = source.list_playlists().await.unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].id, "ytmusic:PL1");

    let tracks = source.playlist_tracks("PL1").await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "ytmusic:vidA");
    assert_eq!(tracks[0].artist, "Someone");
}
