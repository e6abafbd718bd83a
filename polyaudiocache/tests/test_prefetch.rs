mod common;

use common::{UpstreamBehavior, proxy_manager, spawn_upstream, test_body};
use polyaudiocache::{CacheLayout, Prefetcher, Sidecar};
use polysource::{SourceId, SourceTag};

fn prefetcher(dir: &tempfile::TempDir) -> Prefetcher {
    let layout = CacheLayout::new(dir.path()).unwrap();
    Prefetcher::new(layout, reqwest::Client::new())
}

#[tokio::test]
async fn prefetch_commits_a_complete_entry() {
    let audio = test_body(4096);
    let upstream = spawn_upstream(UpstreamBehavior::Ok {
        body: audio.clone(),
        content_type: Some("audio/webm"),
    })
    .await;
    let manager = proxy_manager(&upstream.base_url, &[SourceTag::YtMusic]);
    let dir = tempfile::tempdir().unwrap();
    let layout = CacheLayout::new(dir.path()).unwrap();
    let prefetcher = Prefetcher::new(layout.clone(), reqwest::Client::new());

    prefetcher.prefetch(&manager, "ytmusic:upnext").await;

    let hit = layout.lookup(&SourceId::decode("ytmusic:upnext")).unwrap();
    assert_eq!(std::fs::read(&hit.content_path).unwrap(), audio);
    let sidecar = Sidecar::read(&hit.sidecar_path).await.unwrap();
    assert_eq!(sidecar.content_type, "audio/webm");
    assert_eq!(sidecar.content_length, audio.len() as u64);
    assert_eq!(upstream.hit_count(), 1);
}

#[tokio::test]
async fn concurrent_prefetches_of_same_id_deduplicate() {
    let audio = test_body(8192);
    let upstream = spawn_upstream(UpstreamBehavior::Ok {
        body: audio,
        content_type: Some("audio/webm"),
    })
    .await;
    let manager = proxy_manager(&upstream.base_url, &[SourceTag::YtMusic]);
    let dir = tempfile::tempdir().unwrap();
    let prefetcher = prefetcher(&dir);

    tokio::join!(
        prefetcher.prefetch(&manager, "ytmusic:racing"),
        prefetcher.prefetch(&manager, "ytmusic:racing"),
    );

    // One claimed the id, the other saw it in flight and backed off
    assert_eq!(upstream.hit_count(), 1);
}

#[tokio::test]
async fn prefetch_of_cache_ineligible_id_is_a_noop() {
    let upstream = spawn_upstream(UpstreamBehavior::Ok {
        body: test_body(64),
        content_type: Some("audio/mp4"),
    })
    .await;
    let manager = proxy_manager(&upstream.base_url, &[SourceTag::Pandora]);
    let dir = tempfile::tempdir().unwrap();
    let prefetcher = prefetcher(&dir);

    prefetcher.prefetch(&manager, "pandora:ephemeral").await;

    assert_eq!(upstream.hit_count(), 0);
    assert!(!dir.path().join("pandora").exists());
}

#[tokio::test]
async fn prefetch_of_cached_id_is_a_noop() {
    let audio = test_body(64);
    let upstream = spawn_upstream(UpstreamBehavior::Ok {
        body: audio,
        content_type: Some("audio/webm"),
    })
    .await;
    let manager = proxy_manager(&upstream.base_url, &[SourceTag::YtMusic]);
    let dir = tempfile::tempdir().unwrap();
    let prefetcher = prefetcher(&dir);

    prefetcher.prefetch(&manager, "ytmusic:already").await;
    assert_eq!(upstream.hit_count(), 1);

    prefetcher.prefetch(&manager, "ytmusic:already").await;
    assert_eq!(upstream.hit_count(), 1);
}

#[tokio::test]
async fn failed_prefetch_releases_the_in_flight_claim() {
    let upstream = spawn_upstream(UpstreamBehavior::Status(500, "transient")).await;
    let manager = proxy_manager(&upstream.base_url, &[SourceTag::YtMusic]);
    let dir = tempfile::tempdir().unwrap();
    let prefetcher = prefetcher(&dir);

    // Swallowed, not propagated
    prefetcher.prefetch(&manager, "ytmusic:flaky").await;
    assert!(dir.path().join("ytmusic").read_dir().map(|mut d| d.next().is_none()).unwrap_or(true));

    // The id is claimable again, a retry reaches upstream
    prefetcher.prefetch(&manager, "ytmusic:flaky").await;
    assert_eq!(upstream.hit_count(), 2);
}

#[tokio::test]
async fn resolution_failure_is_swallowed() {
    let manager = polysource::SourceManager::new(vec![]);
    let dir = tempfile::tempdir().unwrap();
    let prefetcher = prefetcher(&dir);

    // No source for the tag; must return quietly
    prefetcher.prefetch(&manager, "ytmusic:nosource").await;
    assert!(dir.path().join("ytmusic").read_dir().map(|mut d| d.next().is_none()).unwrap_or(true));
}
