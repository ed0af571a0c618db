//! Cache degradation and invalidation through the provider.

use crate::common::{blog_fixture, config_for, write_file};
use async_trait::async_trait;
use mdrepo::RepoError;
use mdrepo::provider::{ContentProvider, ContentReader};
use mdrepo::source::{ContentSource, FileSystemSource, SourceFile};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Wraps a filesystem source with a failure switch.
struct FlakySource {
    inner: FileSystemSource,
    failing: Arc<AtomicBool>,
}

impl FlakySource {
    fn check(&self) -> mdrepo::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepoError::provider(
                "flaky",
                "list_files",
                anyhow::anyhow!("simulated outage"),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn list_files(&self, cancel: &CancellationToken) -> mdrepo::Result<Vec<SourceFile>> {
        self.check()?;
        self.inner.list_files(cancel).await
    }

    async fn list_directories(&self, cancel: &CancellationToken) -> mdrepo::Result<Vec<String>> {
        self.check()?;
        self.inner.list_directories(cancel).await
    }

    async fn read_file(&self, path: &str) -> mdrepo::Result<String> {
        self.check()?;
        self.inner.read_file(path).await
    }

    async fn ensure_root(&self, create: bool) -> mdrepo::Result<()> {
        self.inner.ensure_root(create).await
    }
}

fn flaky_provider(
    root: &std::path::Path,
    cache_ttl_secs: u64,
) -> (ContentProvider, Arc<AtomicBool>) {
    let failing = Arc::new(AtomicBool::new(false));
    let source = FlakySource {
        inner: FileSystemSource::new(root, &Vec::<String>::new()).unwrap(),
        failing: Arc::clone(&failing),
    };
    let config = mdrepo::config::RepositoryConfig {
        cache_ttl_secs,
        ..config_for(root)
    };
    (
        ContentProvider::new(config, Arc::new(source)).unwrap(),
        failing,
    )
}

#[tokio::test]
async fn reload_failure_serves_the_stale_snapshot() {
    let fixture = blog_fixture().await;
    // TTL zero: every read is a reload attempt.
    let (provider, failing) = flaky_provider(fixture.path(), 0);

    let healthy = provider.get_all_items().await.unwrap();
    assert_eq!(healthy.items.len(), 3);

    failing.store(true, Ordering::SeqCst);
    let stale = provider.get_all_items().await.unwrap();
    assert!(
        Arc::ptr_eq(&healthy, &stale),
        "the previous snapshot is served unchanged"
    );

    failing.store(false, Ordering::SeqCst);
    let fresh = provider.get_all_items().await.unwrap();
    assert!(!Arc::ptr_eq(&healthy, &fresh), "recovery reloads");
}

#[tokio::test]
async fn first_load_failure_surfaces_the_provider_error() {
    let fixture = blog_fixture().await;
    let (provider, failing) = flaky_provider(fixture.path(), 300);
    failing.store(true, Ordering::SeqCst);

    let err = provider.get_all_items().await.unwrap_err();
    assert!(matches!(err, RepoError::Provider { .. }));
}

#[tokio::test]
async fn refresh_then_failure_propagates() {
    let fixture = blog_fixture().await;
    let (provider, failing) = flaky_provider(fixture.path(), 300);
    provider.get_all_items().await.unwrap();

    // An explicit refresh drops the snapshot, so there is nothing stale to
    // degrade to.
    provider.refresh_cache().await.unwrap();
    failing.store(true, Ordering::SeqCst);
    assert!(provider.get_all_items().await.is_err());
}

#[tokio::test]
async fn content_and_directory_caches_fail_independently() {
    let fixture = blog_fixture().await;
    let (provider, failing) = flaky_provider(fixture.path(), 300);

    // Warm only the directory cache, then break the source.
    provider.get_directory_tree().await.unwrap();
    failing.store(true, Ordering::SeqCst);

    assert!(provider.get_all_items().await.is_err(), "content never loaded");
    assert!(
        provider.get_directory_tree().await.is_ok(),
        "directory snapshot is still served"
    );
}

#[tokio::test]
async fn watcher_invalidates_on_filesystem_change() {
    let fixture = blog_fixture().await;
    let config = mdrepo::config::RepositoryConfig {
        watch: true,
        debounce_ms: 100,
        ..config_for(fixture.path())
    };
    let provider = ContentProvider::for_filesystem(config).unwrap();
    provider.initialize().await.unwrap();

    assert_eq!(provider.get_all_items().await.unwrap().items.len(), 3);

    write_file(
        fixture.path(),
        "blog/new.md",
        "---\ntitle: New\n---\nJust arrived.\n",
    )
    .await;

    // Wait out the debounce window, then poll for the invalidation to land.
    let mut observed = 0;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        observed = provider.get_all_items().await.unwrap().items.len();
        if observed == 4 {
            break;
        }
    }
    assert_eq!(observed, 4, "change watcher must invalidate the caches");

    provider.shutdown();
}
