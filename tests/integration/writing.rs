//! The writer capability and its cache post-conditions.

use crate::common::{blog_fixture, config_for, provider_for};
use mdrepo::models::ContentItem;
use mdrepo::provider::{ContentProvider, ContentReader};
use mdrepo::source::{RemoteCommit, RemoteEntry, RemoteRepositoryClient, RemoteSource};
use std::sync::Arc;

#[tokio::test]
async fn filesystem_provider_exposes_the_writer() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());
    assert!(provider.as_writer().is_some());
}

#[tokio::test]
async fn remote_provider_is_read_only() {
    struct NullClient;

    #[async_trait::async_trait]
    impl RemoteRepositoryClient for NullClient {
        async fn list_entries(&self, _path: &str) -> anyhow::Result<Vec<RemoteEntry>> {
            Ok(Vec::new())
        }
        async fn fetch_file(&self, path: &str) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("no such file: {path}")
        }
        async fn fetch_history(&self, _path: &str) -> anyhow::Result<Vec<RemoteCommit>> {
            Ok(Vec::new())
        }
    }

    let source =
        RemoteSource::new("null", Arc::new(NullClient), "", &Vec::<String>::new()).unwrap();
    let config = mdrepo::config::RepositoryConfig {
        provider_id: "remote".to_string(),
        ..Default::default()
    };
    let provider = ContentProvider::new(config, Arc::new(source)).unwrap();
    assert!(provider.as_writer().is_none());
}

#[tokio::test]
async fn saved_item_round_trips_through_the_next_read() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());
    provider.get_all_items().await.unwrap();

    let mut item = ContentItem::new("test", "blog/saved.md");
    item.set_title("Saved Post");
    item.set_author("Writer");
    item.add_tag("saved");
    item.set_slug("saved-post").unwrap();
    item.raw_body = "Persisted body.".to_string();

    let writer = provider.as_writer().expect("filesystem writer");
    writer.save_item(&item).await.unwrap();

    // Post-condition: the write is visible without an explicit refresh.
    let read_back = provider
        .get_item_by_path("blog/saved.md")
        .await
        .unwrap()
        .expect("saved item indexed");
    assert_eq!(read_back.title, "Saved Post");
    assert_eq!(read_back.author, "Writer");
    assert_eq!(read_back.tags(), &["saved".to_string()]);
    assert!(read_back.raw_body.contains("Persisted body."));
}

#[tokio::test]
async fn deleted_item_disappears_from_the_index() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());
    assert_eq!(provider.get_all_items().await.unwrap().items.len(), 3);

    let writer = provider.as_writer().unwrap();
    writer.delete_item("blog/a.md").await.unwrap();

    let snapshot = provider.get_all_items().await.unwrap();
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.by_path("blog/a.md").is_none());
}

#[tokio::test]
async fn config_file_drives_a_provider() {
    let fixture = blog_fixture().await;
    let config_path = fixture.path().join("mdrepo.toml");
    tokio::fs::write(
        &config_path,
        format!(
            "provider_id = \"configured\"\nroot = \"{}\"\nexclude = [\"**/notes/**\"]\n",
            fixture.path().display()
        ),
    )
    .await
    .unwrap();

    let config = mdrepo::config::RepositoryConfig::load(&config_path).await.unwrap();
    let provider = ContentProvider::for_filesystem(config).unwrap();
    let snapshot = provider.get_all_items().await.unwrap();
    assert_eq!(snapshot.items.len(), 2, "notes/ is excluded");
    assert_eq!(snapshot.items[0].provider_id, "configured");
}

#[tokio::test]
async fn initialize_creates_a_missing_root() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("fresh-root");
    let config = mdrepo::config::RepositoryConfig {
        create_root: true,
        ..config_for(&missing)
    };
    let provider = ContentProvider::for_filesystem(config).unwrap();
    provider.initialize().await.unwrap();
    assert!(missing.is_dir());
    assert!(provider.get_all_items().await.unwrap().items.is_empty());
}
