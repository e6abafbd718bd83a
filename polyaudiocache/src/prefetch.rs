//! Best-effort cache warming.
//!
//! A prefetch warms the cache for a track expected to be needed imminently
//! (typically the `next` queued track). Nothing awaits the result: failures
//! are logged and swallowed, and a failed prefetch is safe to retry later.
//! A process-wide in-flight set guarantees at most one active prefetch per
//! composite id; a primary request racing a prefetch on the same id is
//! accepted — both write the same bytes, and the second rename overwrites
//! the first harmlessly.

use crate::engine::download_to_cache;
use crate::layout::CacheLayout;
use polysource::{SourceId, SourceManager};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Prefetcher {
    layout: CacheLayout,
    client: reqwest::Client,
    in_flight: Mutex<HashSet<String>>,
}

impl Prefetcher {
    pub fn new(layout: CacheLayout, client: reqwest::Client) -> Self {
        Self {
            layout,
            client,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Warms the cache for a composite id.
    ///
    /// No-op when the tag is cache-ineligible, when a committed entry
    /// already exists, or when the same id is already being warmed. Never
    /// returns an error; there is no synchronous caller to report one to.
    pub async fn prefetch(&self, manager: &SourceManager, opaque_id: &str) {
        let id = SourceId::decode(opaque_id);

        if !id.tag.cacheable() {
            debug!(id = %id, "Prefetch skipped, source not cache-eligible");
            return;
        }
        if self.layout.lookup(&id).is_some() {
            debug!(id = %id, "Prefetch skipped, entry already cached");
            return;
        }

        // Claim the id before any I/O starts; the guard releases it on
        // every exit path, success or failure.
        if !self.in_flight.lock().unwrap().insert(opaque_id.to_string()) {
            debug!(id = %id, "Prefetch skipped, already in flight");
            return;
        }
        let _guard = InFlightGuard {
            set: &self.in_flight,
            id: opaque_id.to_string(),
        };

        if let Err(e) = self.warm(manager, &id).await {
            warn!(id = %id, "Prefetch failed: {e}");
        } else {
            debug!(id = %id, "Prefetch completed");
        }
    }

    async fn warm(
        &self,
        manager: &SourceManager,
        id: &SourceId,
    ) -> Result<(), crate::engine::CacheError> {
        let url = manager
            .stream_url(id.tag, &id.native_id)
            .await
            .map_err(|e| crate::engine::CacheError::Resolution(e.to_string()))?;
        download_to_cache(&self.layout, &self.client, id, &url).await
    }
}

/// Removes an id from the in-flight set when dropped
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().unwrap().remove(&self.id);
    }
}
