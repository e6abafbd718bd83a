//! Config-driven source manager assembly.
//!
//! The fallback manager (no session) only carries backends that need no
//! per-user authentication; session managers additionally get the radio
//! backend when credentials are configured. A backend that fails to come up
//! is logged and skipped, same policy as the search fan-out.

use polyconfig::get_config;
use polypandora::{PandoraClient, PandoraSource};
use polysource::{
    ManagerFactory, MusicSource, MusicSourceError, Result, Session, SourceManager, async_trait,
};
use polyytm::{YtMusicClient, YtMusicSource};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ConfigManagerFactory {
    /// Shared connection pool, also used by the cache engine
    http_client: reqwest::Client,
}

impl ConfigManagerFactory {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ManagerFactory for ConfigManagerFactory {
    async fn build(&self, session: Option<&Session>) -> Result<SourceManager> {
        let config = get_config();
        let mut sources: Vec<Arc<dyn MusicSource>> = Vec::new();

        if config.get_ytm_enabled() {
            match YtMusicClient::builder()
                .api_base(config.get_ytm_api_base())
                .client(self.http_client.clone())
                .build()
            {
                Ok(client) => {
                    sources.push(Arc::new(YtMusicSource::new(client)));
                }
                Err(e) => warn!("Catalog backend unavailable, skipping: {e}"),
            }
        }

        // The radio backend holds a per-user auth token, so it never joins
        // the session-independent fallback manager.
        if session.is_some() && config.get_pandora_enabled() {
            match config.get_pandora_credentials() {
                Some((username, password)) => {
                    match PandoraClient::login(&username, &password).await {
                        Ok(client) => {
                            sources.push(Arc::new(PandoraSource::new(client)));
                        }
                        Err(e) => warn!("Radio backend login failed, skipping: {e}"),
                    }
                }
                None => warn!("Radio backend enabled but credentials are not configured"),
            }
        }

        if sources.is_empty() {
            return Err(MusicSourceError::SourceUnavailable(
                "no music source is enabled".into(),
            ));
        }

        info!(count = sources.len(), session = session.is_some(), "Assembled source manager");
        Ok(SourceManager::new(sources))
    }
}
