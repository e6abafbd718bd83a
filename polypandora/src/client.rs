//! HTTP client for the radio service REST API
//!
//! Logs in once at construction and sends the auth token on every call.
//! Re-authentication after token expiry is the caller's concern: the
//! registry rebuilds the whole source on `invalidate_all`.

use crate::error::{PandoraError, Result};
use crate::models::{
    AuthResponse, FragmentResponse, FragmentTrack, Station, StationsResponse, TrackAudioResponse,
};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://www.pandora.com/api/v1";

/// Default timeout for API requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "polypandora/0.1.0";

/// Auth token request header
const AUTH_HEADER: &str = "X-AuthToken";

#[derive(Debug)]
pub struct PandoraClient {
    client: Client,
    api_base: String,
    auth_token: String,
}

impl PandoraClient {
    /// Logs in with the given credentials and returns an authenticated client
    pub async fn login(username: &str, password: &str) -> Result<Self> {
        Self::login_with_base(DEFAULT_API_BASE, username, password).await
    }

    /// Logs in against a custom API base (tests point this at a local server)
    pub async fn login_with_base(api_base: &str, username: &str, password: &str) -> Result<Self> {
        Url::parse(api_base)?;
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;

        let url = endpoint(api_base, "auth/login")?;
        debug!(url = %url, "Radio service login");
        let response = client
            .post(url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PandoraError::Auth("login rejected".into()));
        }
        if !status.is_success() {
            return Err(PandoraError::Api(status.as_u16()));
        }

        let auth: AuthResponse = response.json().await?;
        info!("Radio service login succeeded");

        Ok(Self {
            client,
            api_base: api_base.to_string(),
            auth_token: auth.auth_token,
        })
    }

    /// Logs in with the credentials from the global configuration
    pub async fn from_config() -> Result<Self> {
        let config = polyconfig::get_config();
        let (username, password) = config
            .get_pandora_credentials()
            .ok_or_else(|| PandoraError::Auth("credentials not configured".into()))?;
        Self::login(&username, &password).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = endpoint(&self.api_base, path)?;
        debug!(url = %url, "Radio service request");
        let response = self
            .client
            .post(url)
            .header(AUTH_HEADER, &self.auth_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(PandoraError::Auth("auth token expired".into()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PandoraError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(PandoraError::Api(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Lists the listener's stations
    pub async fn stations(&self) -> Result<Vec<Station>> {
        let response: StationsResponse = self
            .post_json("station/getStations", json!({ "pageSize": 250 }))
            .await?;
        Ok(response.stations)
    }

    /// Fetches the next playlist fragment for a station
    pub async fn station_fragment(&self, station_id: &str) -> Result<Vec<FragmentTrack>> {
        let response: FragmentResponse = self
            .post_json(
                "playlist/getFragment",
                json!({ "stationId": station_id, "isStationStart": false }),
            )
            .await?;
        Ok(response.tracks)
    }

    /// Resolves a track token to its short-lived audio URL
    pub async fn track_audio(&self, track_token: &str) -> Result<String> {
        let response: TrackAudioResponse = self
            .post_json(
                "playlist/getTrackAudio",
                json!({ "trackToken": track_token }),
            )
            .await?;
        Ok(response.audio_url)
    }
}

fn endpoint(api_base: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly() {
        let url = endpoint("https://host/api/v1/", "auth/login").unwrap();
        assert_eq!(url.as_str(), "https://host/api/v1/auth/login");
    }
}
