//! Shared test fixtures: an in-process fake upstream with a fetch counter,
//! and a minimal streaming source that proxies to it.

use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use polysource::{MusicSource, Result, SourceManager, SourceTag, async_trait};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the fake upstream answers with
#[derive(Debug, Clone)]
pub enum UpstreamBehavior {
    Ok {
        body: Vec<u8>,
        content_type: Option<&'static str>,
    },
    Status(u16, &'static str),
}

pub struct FakeUpstream {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
}

impl FakeUpstream {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Spawns an axum server on an ephemeral port serving `GET /audio/{id}`
pub async fn spawn_upstream(behavior: UpstreamBehavior) -> FakeUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    let app = Router::new().route(
        "/audio/{id}",
        get(move |Path(_id): Path<String>| {
            let behavior = behavior.clone();
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                match behavior {
                    UpstreamBehavior::Ok { body, content_type } => {
                        let mut builder = Response::builder().status(StatusCode::OK);
                        if let Some(ct) = content_type {
                            builder = builder.header(header::CONTENT_TYPE, ct);
                        }
                        builder
                            .header(header::CONTENT_LENGTH, body.len())
                            .body(Body::from(body))
                            .unwrap()
                    }
                    UpstreamBehavior::Status(code, message) => Response::builder()
                        .status(StatusCode::from_u16(code).unwrap())
                        .body(Body::from(message))
                        .unwrap(),
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// A source that resolves every native id to the fake upstream
#[derive(Debug)]
pub struct ProxySource {
    pub tag: SourceTag,
    pub base_url: String,
}

#[async_trait]
impl MusicSource for ProxySource {
    fn tag(&self) -> SourceTag {
        self.tag
    }

    fn name(&self) -> &str {
        "proxy-source"
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn stream_url(&self, native_id: &str) -> Result<String> {
        Ok(format!("{}/audio/{}", self.base_url, native_id))
    }
}

/// Manager with one proxying source per requested tag
pub fn proxy_manager(base_url: &str, tags: &[SourceTag]) -> SourceManager {
    let sources = tags
        .iter()
        .map(|&tag| {
            Arc::new(ProxySource {
                tag,
                base_url: base_url.to_string(),
            }) as Arc<dyn MusicSource>
        })
        .collect();
    SourceManager::new(sources)
}

/// Deterministic pseudo-audio payload
pub fn test_body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Polls until the layout reports a committed entry, or panics after ~5s
pub async fn wait_for_commit(
    layout: &polyaudiocache::CacheLayout,
    id: &polysource::SourceId,
) -> polyaudiocache::CacheHit {
    for _ in 0..250 {
        if let Some(hit) = layout.lookup(id) {
            return hit;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("cache entry for {id} was never committed");
}
