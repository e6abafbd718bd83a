mod api;
mod factory;

use factory::ConfigManagerFactory;
use polyaudiocache::{CacheLayout, Prefetcher, StreamEngine, StreamState, stream_router};
use polyserver::Server;
use polysource::ManagerRegistry;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    polyserver::init_logging();

    let config = polyconfig::get_config();

    // One connection pool shared by the backends and the cache engine
    let http_client = reqwest::Client::new();

    let registry = Arc::new(ManagerRegistry::new(Arc::new(ConfigManagerFactory::new(
        http_client.clone(),
    ))));

    let cache_dir = config.get_audio_cache_dir()?;
    info!(cache_dir = %cache_dir, "Audio cache ready");
    let layout = CacheLayout::new(&cache_dir)?;

    let stream_state = Arc::new(StreamState {
        engine: StreamEngine::new(layout.clone(), http_client.clone()),
        prefetcher: Arc::new(Prefetcher::new(layout, http_client)),
        registry: Arc::clone(&registry),
        prefetch_enabled: config.get_prefetch_enabled(),
    });

    let mut server = Server::new_configured();
    server.add_router("/", stream_router(stream_state)).await;
    server.add_router("/api", api::api_router(registry)).await;
    server
        .add_route("/info", || async {
            serde_json::json!({ "name": "Polyphon", "version": env!("CARGO_PKG_VERSION") })
        })
        .await;

    server.start().await;
    info!("Polyphon is ready, press Ctrl+C to stop");
    server.wait().await;

    Ok(())
}
