use polypandora::{PandoraClient, PandoraError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn logged_in_client(server: &MockServer) -> PandoraClient {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authToken": "tok-abc",
            "listenerId": "L1"
        })))
        .mount(server)
        .await;

    PandoraClient::login_with_base(&format!("{}/api/v1", server.uri()), "user", "pass")
        .await
        .unwrap()
}

#[tokio::test]
async fn login_failure_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = PandoraClient::login_with_base(&format!("{}/api/v1", server.uri()), "user", "bad")
        .await
        .unwrap_err();
    assert!(matches!(err, PandoraError::Auth(_)));
}

#[tokio::test]
async fn stations_request_carries_auth_token() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/station/getStations"))
        .and(header("X-AuthToken", "tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stations": [
                {"stationId": "st-1", "name": "Jazz Radio"},
                {"stationId": "st-2", "name": "Classic Rock"}
            ]
        })))
        .mount(&server)
        .await;

    let stations = client.stations().await.unwrap();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].station_id, "st-1");
}

#[tokio::test]
async fn fragment_returns_tracks_with_audio() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/playlist/getFragment"))
        .and(body_partial_json(json!({ "stationId": "st-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [{
                "trackToken": "tok:1:2",
                "songTitle": "Take Five",
                "artistName": "Dave Brubeck",
                "trackLength": 324,
                "audioURL": "https://audio.example/t.m4a?exp=1"
            }]
        })))
        .mount(&server)
        .await;

    let tracks = client.station_fragment("st-1").await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_token, "tok:1:2");
    assert_eq!(tracks[0].track_length, Some(324));
}

#[tokio::test]
async fn track_audio_resolves_short_lived_url() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/playlist/getTrackAudio"))
        .and(body_partial_json(json!({ "trackToken": "tok-9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audioURL": "https://audio.example/play/tok-9.m4a?exp=300"
        })))
        .mount(&server)
        .await;

    let url = client.track_audio("tok-9").await.unwrap();
    assert!(url.contains("tok-9"));
}

#[tokio::test]
async fn expired_token_maps_to_auth_error() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/station/getStations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.stations().await.unwrap_err();
    assert!(matches!(err, PandoraError::Auth(_)));
}
