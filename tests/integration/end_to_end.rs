//! Full index-and-query flows over the blog fixture.

use crate::common::{blog_fixture, provider_for, write_file};
use mdrepo::models::ContentQuery;
use mdrepo::provider::ContentReader;
use std::sync::Arc;

#[tokio::test]
async fn directory_and_tag_query_returns_exactly_the_matching_item() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let items = provider
        .get_items_by_query(&ContentQuery::new().with_directory("blog").with_tag("x"))
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "A");
    assert_eq!(items[0].url, "/blog/a");
    assert_eq!(items[0].slug, "a");
}

#[tokio::test]
async fn tags_are_grouped_counted_and_sorted_by_name() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let tags = provider.get_tags().await.unwrap();
    let summary: Vec<(&str, usize)> =
        tags.iter().map(|t| (t.name.as_str(), t.count)).collect();
    assert_eq!(summary, vec![("x", 1), ("y", 1)]);
}

#[tokio::test]
async fn index_documents_are_not_content_items() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let snapshot = provider.get_all_items().await.unwrap();
    assert_eq!(snapshot.items.len(), 3);
    assert!(snapshot.items.iter().all(|i| !i.path.ends_with("_index.md")));
}

#[tokio::test]
async fn lookup_by_id_path_and_url_agree() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    let by_path = provider.get_item_by_path("Blog/A.md").await.unwrap().unwrap();
    let by_url = provider.get_item_by_url("/BLOG/A").await.unwrap().unwrap();
    let by_id = provider.get_item_by_id(by_path.id()).await.unwrap().unwrap();

    assert_eq!(by_path.id(), by_url.id());
    assert_eq!(by_path.id(), by_id.id());
    assert!(provider.get_item_by_id("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn corrupt_document_is_skipped_not_fatal() {
    let fixture = blog_fixture().await;
    write_file(
        fixture.path(),
        "blog/broken.md",
        "---\ntitle: [unclosed\n---\nbody",
    )
    .await;
    let provider = provider_for(fixture.path());

    let snapshot = provider.get_all_items().await.unwrap();
    assert_eq!(snapshot.items.len(), 3, "the broken document is skipped");
}

#[tokio::test]
async fn refresh_picks_up_new_documents() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path());

    assert_eq!(provider.get_all_items().await.unwrap().items.len(), 3);

    write_file(
        fixture.path(),
        "blog/d.md",
        "---\ntitle: \"D\"\n---\nLate arrival.\n",
    )
    .await;
    // Still cached: the new file is invisible until a refresh.
    assert_eq!(provider.get_all_items().await.unwrap().items.len(), 3);

    provider.refresh_cache().await.unwrap();
    assert_eq!(provider.get_all_items().await.unwrap().items.len(), 4);
}

#[tokio::test]
async fn renderer_populates_rendered_body() {
    let fixture = blog_fixture().await;
    let provider = provider_for(fixture.path())
        .with_renderer(Arc::new(|md: &str| format!("<p>{}</p>", md.trim())));

    let item = provider.get_item_by_path("blog/a.md").await.unwrap().unwrap();
    assert_eq!(item.rendered_body.as_deref(), Some("<p>First post body.</p>"));
}

#[tokio::test]
async fn concurrent_readers_share_one_snapshot() {
    let fixture = blog_fixture().await;
    let provider = Arc::new(provider_for(fixture.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move { provider.get_all_items().await.unwrap() })
        })
        .collect();
    let snapshots: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    for snapshot in &snapshots[1..] {
        assert!(Arc::ptr_eq(&snapshots[0], snapshot));
    }
}
