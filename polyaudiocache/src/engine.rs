//! Streaming cache engine.
//!
//! Serves `GET /stream/{id}` requests: decode the composite id, resolve a
//! playable URL through the source manager, then either serve the committed
//! cache entry (with byte-range support) or proxy the upstream response —
//! teeing cache-eligible full responses to disk on the way through.
//!
//! The request state machine is `RESOLVE → {HIT, MISS} → SERVE`. Correctness
//! of the cache relies on two things only: the filesystem's rename being
//! atomic, and lookup recognizing final filenames exclusively. There is no
//! lock around the content+sidecar pair.

use crate::layout::{CacheLayout, CacheHit, ext_for_content_type};
use crate::range::ByteRange;
use crate::sidecar::Sidecar;
use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures_util::StreamExt;
use polysource::{SourceId, SourceManager};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Chunks buffered between the upstream reader and the client body before
/// back-pressure kicks in.
const TEE_CHANNEL_CAPACITY: usize = 16;

/// Errors internal to the engine; every variant degrades to "serve without
/// caching" or a 502 at the boundary, never a process failure.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(StatusCode),

    #[error("upstream response carries no content type")]
    MissingContentType,

    #[error("stream resolution failed: {0}")]
    Resolution(String),
}

/// The streaming cache engine
#[derive(Debug, Clone)]
pub struct StreamEngine {
    layout: CacheLayout,
    client: reqwest::Client,
}

impl StreamEngine {
    pub fn new(layout: CacheLayout, client: reqwest::Client) -> Self {
        Self { layout, client }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Serves one streaming request.
    ///
    /// `opaque_id` is the composite id (already percent-decoded by the HTTP
    /// layer); `range_header` is the raw inbound `Range` value, if any.
    pub async fn serve(
        &self,
        manager: &SourceManager,
        opaque_id: &str,
        range_header: Option<&str>,
    ) -> Response {
        let id = SourceId::decode(opaque_id);

        // Cache-ineligible tags force the miss branch regardless of any
        // stale file that might sit on disk.
        if id.tag.cacheable() {
            if let Some(hit) = self.layout.lookup(&id) {
                match self.serve_hit(&hit, range_header).await {
                    Ok(response) => return with_cors(response),
                    Err(e) => {
                        warn!(id = %id, "Cache hit unreadable, falling back to upstream: {e}");
                    }
                }
            }
        }

        with_cors(self.serve_miss(manager, &id, range_header).await)
    }

    /// HIT: serve the committed entry, honoring a parseable Range header
    async fn serve_hit(
        &self,
        hit: &CacheHit,
        range_header: Option<&str>,
    ) -> Result<Response, CacheError> {
        let sidecar = Sidecar::read(&hit.sidecar_path).await?;
        let total = sidecar.content_length;
        let slice = range_header
            .and_then(ByteRange::parse)
            .and_then(|r| r.slice(total));

        let mut file = tokio::fs::File::open(&hit.content_path).await?;

        let response = match slice {
            Some(slice) => {
                file.seek(SeekFrom::Start(slice.start)).await?;
                let body = Body::from_stream(ReaderStream::new(file.take(slice.len())));
                Response::builder()
                    .status(StatusCode::PARTIAL_CONTENT)
                    .header(header::CONTENT_TYPE, &sidecar.content_type)
                    .header(header::CONTENT_LENGTH, slice.len())
                    .header(header::CONTENT_RANGE, slice.content_range(total))
                    .header(header::ACCEPT_RANGES, "bytes")
                    .body(body)
            }
            None => {
                let body = Body::from_stream(ReaderStream::new(file));
                Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, &sidecar.content_type)
                    .header(header::CONTENT_LENGTH, total)
                    .header(header::ACCEPT_RANGES, "bytes")
                    .body(body)
            }
        };

        Ok(response.expect("static response construction"))
    }

    /// MISS: resolve the playable URL and proxy the upstream response,
    /// teeing it to disk when the entry is worth keeping
    async fn serve_miss(
        &self,
        manager: &SourceManager,
        id: &SourceId,
        range_header: Option<&str>,
    ) -> Response {
        let url = match manager.stream_url(id.tag, &id.native_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!(id = %id, "Stream URL resolution failed: {e}");
                return bad_gateway(format!("stream resolution failed: {e}"));
            }
        };

        let mut request = self.client.get(&url);
        if let Some(range) = range_header {
            // Forwarded verbatim; the upstream decides what it honors
            request = request.header(header::RANGE, range);
        }

        let upstream = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(id = %id, "Upstream request failed: {e}");
                return bad_gateway(format!("upstream request failed: {e}"));
            }
        };

        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

        if !status.is_success() {
            // Forward status and body unmodified, no cache side effects
            let body = upstream.bytes().await.unwrap_or_default();
            return Response::builder()
                .status(status)
                .body(Body::from(body))
                .expect("static response construction");
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_range = upstream
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = upstream.content_length();

        let full_request = range_header.is_none() && status != StatusCode::PARTIAL_CONTENT;

        if full_request && id.tag.cacheable() {
            if let Some(content_type) = content_type.clone() {
                return self
                    .tee_to_cache(id, upstream, status, content_type, content_length)
                    .await;
            }
            debug!(id = %id, "Upstream has no content type, passing through uncached");
        }

        passthrough(upstream, status, content_type, content_range, content_length)
    }

    /// Fans the upstream byte stream out to the client and to a `.partial`
    /// cache file; commits with rename-then-sidecar on completion.
    async fn tee_to_cache(
        &self,
        id: &SourceId,
        upstream: reqwest::Response,
        status: StatusCode,
        content_type: String,
        content_length: Option<u64>,
    ) -> Response {
        let final_path = self
            .layout
            .content_path(id, ext_for_content_type(&content_type));
        let partial_path = CacheLayout::partial_path(&final_path);

        if let Err(e) = tokio::fs::create_dir_all(self.layout.source_dir(id)).await {
            warn!(id = %id, "Cannot create cache directory, passing through uncached: {e}");
            return passthrough(upstream, status, Some(content_type), None, content_length);
        }
        let file = match tokio::fs::File::create(&partial_path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(id = %id, "Cannot create cache file, passing through uncached: {e}");
                return passthrough(upstream, status, Some(content_type), None, content_length);
            }
        };

        let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(TEE_CHANNEL_CAPACITY);

        let writer = TeeWriter {
            id: id.clone(),
            file,
            partial_path,
            final_path,
            content_type: content_type.clone(),
            tx,
        };
        tokio::spawn(writer.run(upstream));

        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::ACCEPT_RANGES, "bytes");
        if let Some(length) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, length);
        }
        builder
            .body(Body::from_stream(ReceiverStream::new(rx)))
            .expect("static response construction")
    }
}

/// Drives one tee: reads upstream chunks, appends them to the `.partial`
/// file, and forwards them to the client channel. Runs detached so a client
/// disconnect never interrupts the cache write.
struct TeeWriter {
    id: SourceId,
    file: tokio::fs::File,
    partial_path: PathBuf,
    final_path: PathBuf,
    content_type: String,
    tx: mpsc::Sender<Result<Bytes, std::io::Error>>,
}

impl TeeWriter {
    async fn run(mut self, upstream: reqwest::Response) {
        let mut stream = upstream.bytes_stream();
        let mut client_gone = false;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    // Upstream died: abort the client body and drop the
                    // partial file so it can never be mistaken for a hit.
                    warn!(id = %self.id, "Upstream stream failed mid-transfer: {e}");
                    if !client_gone {
                        let _ = self.tx.send(Err(std::io::Error::other(e))).await;
                    }
                    self.discard_partial().await;
                    return;
                }
            };

            if let Err(e) = self.file.write_all(&chunk).await {
                warn!(id = %self.id, "Cache write failed mid-transfer: {e}");
                if !client_gone {
                    let _ = self.tx.send(Err(std::io::Error::other(e))).await;
                }
                self.discard_partial().await;
                return;
            }
            written += chunk.len() as u64;

            // The disk copy outlives the client: a closed receiver only
            // stops the forwarding, not the caching.
            if !client_gone && self.tx.send(Ok(chunk)).await.is_err() {
                client_gone = true;
                debug!(id = %self.id, "Client disconnected, cache write continues");
            }
        }

        if let Err(e) = self.file.flush().await {
            warn!(id = %self.id, "Cache flush failed: {e}");
            self.discard_partial().await;
            return;
        }
        drop(self.file);

        // Commit order matters: rename first, sidecar second. The entry
        // becomes a hit only once both final names exist.
        if let Err(e) = tokio::fs::rename(&self.partial_path, &self.final_path).await {
            warn!(id = %self.id, "Cache commit rename failed: {e}");
            let _ = tokio::fs::remove_file(&self.partial_path).await;
            return;
        }
        let sidecar = Sidecar::new(&self.content_type, written);
        if let Err(e) = sidecar.write(&CacheLayout::sidecar_path(&self.final_path)).await {
            warn!(id = %self.id, "Sidecar write failed: {e}");
            return;
        }
        debug!(id = %self.id, bytes = written, "Cached entry committed");
    }

    async fn discard_partial(&self) {
        // Best effort: a stray .partial is self-healing, lookup ignores it
        if let Err(e) = tokio::fs::remove_file(&self.partial_path).await {
            debug!(path = %self.partial_path.display(), "Could not remove partial file: {e}");
        }
    }
}

/// Streams the upstream body straight through without touching the cache
fn passthrough(
    upstream: reqwest::Response,
    status: StatusCode,
    content_type: Option<String>,
    content_range: Option<String>,
    content_length: Option<u64>,
) -> Response {
    let mut builder = Response::builder()
        .status(status)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    if let Some(cr) = content_range {
        builder = builder.header(header::CONTENT_RANGE, cr);
    }
    if let Some(length) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    let body = Body::from_stream(upstream.bytes_stream().map(|chunk| {
        chunk.map_err(std::io::Error::other)
    }));
    builder.body(body).expect("static response construction")
}

/// Resolution and upstream-connection failures surface as plain-text 502s
fn bad_gateway(message: String) -> Response {
    with_cors(
        Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(message))
            .expect("static response construction"),
    )
}

/// Permissive CORS so a browser-hosted player can read the range headers
fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Range, Accept-Ranges, Content-Length"),
    );
    response
}

/// Shared helper for paths that download a full body into the cache without
/// a client attached (prefetch). Same commit protocol as the tee.
pub(crate) async fn download_to_cache(
    layout: &CacheLayout,
    client: &reqwest::Client,
    id: &SourceId,
    url: &str,
) -> Result<(), CacheError> {
    let upstream = client.get(url).send().await?;
    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    if !status.is_success() {
        return Err(CacheError::UpstreamStatus(status));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(CacheError::MissingContentType)?
        .to_string();

    let final_path = layout.content_path(id, ext_for_content_type(&content_type));
    let partial_path = CacheLayout::partial_path(&final_path);
    tokio::fs::create_dir_all(layout.source_dir(id)).await?;

    let written = match write_stream_to(&partial_path, upstream).await {
        Ok(written) => written,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial_path, &final_path).await?;
    Sidecar::new(content_type, written)
        .write(&CacheLayout::sidecar_path(&final_path))
        .await?;
    Ok(())
}

async fn write_stream_to(path: &Path, upstream: reqwest::Response) -> Result<u64, CacheError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = upstream.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
