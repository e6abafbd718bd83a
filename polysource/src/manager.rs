//! Source aggregation.
//!
//! [`SourceManager`] owns the set of [`MusicSource`] instances assembled for
//! one session (or for the session-independent fallback) and provides the two
//! dispatch styles the hub needs: fan-out over every capable source (search),
//! and exact-match dispatch by tag (stream URL resolution, playlists).

use crate::{
    CanonicalPlaylist, CanonicalTrack, MusicSource, MusicSourceError, Result, SearchResults,
    SourceTag,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Aggregates a set of sources and dispatches operations by tag
pub struct SourceManager {
    sources: Vec<Arc<dyn MusicSource>>,
}

impl SourceManager {
    /// Creates a manager over the given sources
    ///
    /// Registration order is preserved; it determines the order of search
    /// result concatenation.
    pub fn new(sources: Vec<Arc<dyn MusicSource>>) -> Self {
        for source in &sources {
            debug!(tag = %source.tag(), name = source.name(), "Registered source");
        }
        Self { sources }
    }

    /// Returns the registered source for a tag, if any
    pub fn source_for(&self, tag: SourceTag) -> Option<&Arc<dyn MusicSource>> {
        self.sources.iter().find(|s| s.tag() == tag)
    }

    /// Returns the tags of every registered source
    pub fn tags(&self) -> Vec<SourceTag> {
        self.sources.iter().map(|s| s.tag()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Searches every source that supports it, concurrently.
    ///
    /// A single source's failure is logged and excluded; partial results are
    /// success, not failure. Sources without the search capability are
    /// skipped silently.
    pub async fn search_all(&self, query: &str) -> SearchResults {
        let futures = self
            .sources
            .iter()
            .filter(|s| s.supports_search())
            .map(|s| {
                let source = Arc::clone(s);
                let query = query.to_string();
                async move { (source.tag(), source.name().to_string(), source.search(&query).await) }
            })
            .collect::<Vec<_>>();

        let mut merged = SearchResults::default();
        for (tag, name, outcome) in futures::future::join_all(futures).await {
            match outcome {
                Ok(results) => merged.merge(results),
                Err(e) => {
                    warn!(tag = %tag, source = %name, "Search failed, excluding source: {e}");
                }
            }
        }
        merged
    }

    /// Resolves a playable URL for `(tag, native_id)`.
    ///
    /// Fails with [`MusicSourceError::NoSourceForTag`] when no source is
    /// registered under the tag; the streaming boundary turns that into a
    /// 502.
    pub async fn stream_url(&self, tag: SourceTag, native_id: &str) -> Result<String> {
        let source = self
            .source_for(tag)
            .ok_or(MusicSourceError::NoSourceForTag(tag))?;
        source.stream_url(native_id).await
    }

    /// Lists the playlists of the source registered under `tag`
    pub async fn list_playlists(&self, tag: SourceTag) -> Result<Vec<CanonicalPlaylist>> {
        let source = self
            .source_for(tag)
            .ok_or(MusicSourceError::NoSourceForTag(tag))?;
        source.list_playlists().await
    }

    /// Returns the canonical tracks of one playlist
    pub async fn playlist_tracks(
        &self,
        tag: SourceTag,
        playlist_id: &str,
    ) -> Result<Vec<CanonicalTrack>> {
        let source = self
            .source_for(tag)
            .ok_or(MusicSourceError::NoSourceForTag(tag))?;
        source.playlist_tracks(playlist_id).await
    }

    /// Returns the canonical tracks of one album
    pub async fn album_tracks(&self, tag: SourceTag, album_id: &str) -> Result<Vec<CanonicalTrack>> {
        let source = self
            .source_for(tag)
            .ok_or(MusicSourceError::NoSourceForTag(tag))?;
        source.album_tracks(album_id).await
    }
}

impl std::fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceManager")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SourceId, async_trait};

    #[derive(Debug)]
    struct StubCatalog {
        tag: SourceTag,
        fail_search: bool,
    }

    #[async_trait]
    impl MusicSource for StubCatalog {
        fn tag(&self) -> SourceTag {
            self.tag
        }

        fn name(&self) -> &str {
            "stub-catalog"
        }

        fn supports_search(&self) -> bool {
            true
        }

        async fn search(&self, query: &str) -> Result<SearchResults> {
            if self.fail_search {
                return Err(MusicSourceError::SourceUnavailable("stub outage".into()));
            }
            Ok(SearchResults {
                tracks: vec![CanonicalTrack::new(
                    SourceId::new(self.tag, format!("{query}-hit")),
                    query,
                    "artist",
                )],
                albums: vec![],
            })
        }

        fn supports_streaming(&self) -> bool {
            true
        }

        async fn stream_url(&self, native_id: &str) -> Result<String> {
            Ok(format!("http://upstream/{native_id}"))
        }
    }

    /// A source with no capabilities beyond its tag
    #[derive(Debug)]
    struct InertSource;

    #[async_trait]
    impl MusicSource for InertSource {
        fn tag(&self) -> SourceTag {
            SourceTag::Pandora
        }

        fn name(&self) -> &str {
            "inert"
        }
    }

    #[tokio::test]
    async fn search_excludes_failing_sources() {
        let manager = SourceManager::new(vec![
            Arc::new(StubCatalog {
                tag: SourceTag::YtMusic,
                fail_search: false,
            }),
            Arc::new(StubCatalog {
                tag: SourceTag::Pandora,
                fail_search: true,
            }),
        ]);

        let results = manager.search_all("query").await;
        assert_eq!(results.tracks.len(), 1);
        assert_eq!(results.tracks[0].source.tag, SourceTag::YtMusic);
    }

    #[tokio::test]
    async fn search_skips_sources_without_capability() {
        let manager = SourceManager::new(vec![Arc::new(InertSource)]);
        let results = manager.search_all("anything").await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn stream_url_dispatches_by_tag() {
        let manager = SourceManager::new(vec![Arc::new(StubCatalog {
            tag: SourceTag::YtMusic,
            fail_search: false,
        })]);

        let url = manager
            .stream_url(SourceTag::YtMusic, "abc123")
            .await
            .unwrap();
        assert_eq!(url, "http://upstream/abc123");

        let err = manager
            .stream_url(SourceTag::Pandora, "abc123")
            .await
            .unwrap_err();
        assert!(matches!(err, MusicSourceError::NoSourceForTag(_)));
    }

    #[tokio::test]
    async fn absent_capability_is_a_typed_error() {
        let manager = SourceManager::new(vec![Arc::new(InertSource)]);
        let err = manager
            .list_playlists(SourceTag::Pandora)
            .await
            .unwrap_err();
        assert!(matches!(err, MusicSourceError::NotSupported(_)));
    }
}
