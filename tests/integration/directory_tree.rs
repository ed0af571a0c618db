//! Directory tree assembly through the provider.

use crate::common::{blog_fixture, config_for, provider_for, write_file};
use mdrepo::provider::{ContentProvider, ContentReader};
use tempfile::TempDir;

#[tokio::test]
async fn index_document_annotates_the_directory() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let blog = provider
        .get_directory_by_path("blog")
        .await
        .unwrap()
        .expect("blog directory");
    assert_eq!(blog.name, "Tech Blog");
    assert_eq!(blog.order, 1);
    assert_eq!(blog.url, "/blog");
}

#[tokio::test]
async fn items_are_attached_to_their_directory() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let blog = provider.get_directory_by_path("blog").await.unwrap().unwrap();
    assert_eq!(blog.item_ids().len(), 2, "a.md and b.md, not _index.md");

    let snapshot = provider.get_all_items().await.unwrap();
    let a = snapshot.by_path("blog/a.md").unwrap();
    assert!(blog.item_ids().contains(&a.id().to_string()));
    assert_eq!(a.directory_id.as_deref(), Some(blog.id()));
}

#[tokio::test]
async fn nested_directories_link_parent_and_child() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "docs/guide/intro.md", "---\ntitle: Intro\n---\nbody\n").await;
    let provider = provider_for(dir.path());

    let tree = provider.get_directory_tree().await.unwrap();
    let docs = tree.get_by_path("docs").unwrap();
    let guide = tree.get_by_path("docs/guide").unwrap();

    assert_eq!(guide.parent_id(), Some(docs.id()));
    assert!(docs.child_ids().contains(&guide.id().to_string()));
    assert!(docs.is_root());
}

#[tokio::test]
async fn locale_filter_restricts_roots() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "en/docs/a.md", "---\ntitle: A\n---\nbody\n").await;
    write_file(dir.path(), "fr/docs/a.md", "---\ntitle: A\n---\nbody\n").await;
    write_file(dir.path(), "shared/b.md", "---\ntitle: B\n---\nbody\n").await;
    let mut config = config_for(dir.path());
    config.locales = vec!["en".to_string(), "fr".to_string()];
    let provider = ContentProvider::for_filesystem(config).unwrap();

    let all = provider.get_directories(None).await.unwrap();
    assert_eq!(all.len(), 3, "en, fr, and shared roots");

    let french = provider.get_directories(Some("fr")).await.unwrap();
    assert_eq!(french.len(), 1);
    assert_eq!(french[0].path, "fr");

    // "shared" falls under the default locale.
    let english_default = provider.get_directories(Some("en")).await.unwrap();
    let paths: Vec<_> = english_default.iter().map(|d| d.path.as_str()).collect();
    assert!(paths.contains(&"en"));
    assert!(paths.contains(&"shared"));
}

#[tokio::test]
async fn directory_lookup_by_id_and_url() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let by_url = provider.get_directory_by_url("/blog").await.unwrap().unwrap();
    let by_id = provider
        .get_directory_by_id(by_url.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.path, "blog");
    assert!(provider.get_directory_by_id("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn sibling_directories_sort_by_manual_order() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "zeta/_index.md", "---\norder: 1\n---\n").await;
    write_file(dir.path(), "zeta/a.md", "---\ntitle: A\n---\nbody\n").await;
    write_file(dir.path(), "alpha/_index.md", "---\norder: 2\n---\n").await;
    write_file(dir.path(), "alpha/b.md", "---\ntitle: B\n---\nbody\n").await;
    let provider = provider_for(dir.path());

    let roots = provider.get_directories(None).await.unwrap();
    let paths: Vec<_> = roots.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["zeta", "alpha"], "order beats name");
}
