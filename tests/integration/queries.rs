//! Filtering, sorting, and pagination through the provider.

use crate::common::{provider_for, write_file};
use mdrepo::models::{ContentQuery, ContentStatus, SortDirection, SortField};
use mdrepo::provider::ContentReader;
use tempfile::TempDir;

async fn ten_titled_posts() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (index, letter) in "abcdefghij".chars().enumerate() {
        write_file(
            dir.path(),
            &format!("posts/{letter}.md"),
            &format!("---\ntitle: \"{}\"\norder: {}\n---\nbody {letter}\n", letter, 9 - index),
        )
        .await;
    }
    dir
}

#[tokio::test]
async fn pagination_returns_ranks_three_to_five() {
    let fixture = ten_titled_posts().await;
    let provider = provider_for(fixture.path());

    let query = ContentQuery::new()
        .with_sort(SortField::Title, SortDirection::Ascending)
        .with_page(2, 3);
    let items = provider.get_items_by_query(&query).await.unwrap();

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "d", "e"]);
}

#[tokio::test]
async fn take_beyond_end_is_clamped() {
    let fixture = ten_titled_posts().await;
    let provider = provider_for(fixture.path());

    let query = ContentQuery::new()
        .with_sort(SortField::Title, SortDirection::Ascending)
        .with_page(8, 50);
    let items = provider.get_items_by_query(&query).await.unwrap();
    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["i", "j"]);
}

#[tokio::test]
async fn manual_order_sort_uses_front_matter_order() {
    let fixture = ten_titled_posts().await;
    let provider = provider_for(fixture.path());

    let query = ContentQuery::new().with_sort(SortField::Order, SortDirection::Ascending);
    let items = provider.get_items_by_query(&query).await.unwrap();
    // order runs 9..0 against titles a..j, so ascending order reverses them.
    assert_eq!(items.first().unwrap().title, "j");
    assert_eq!(items.last().unwrap().title, "a");
}

#[tokio::test]
async fn status_and_search_filters_compose() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "a.md",
        "---\ntitle: Async Rust\nstatus: published\n---\nFutures and executors.\n",
    )
    .await;
    write_file(
        dir.path(),
        "b.md",
        "---\ntitle: Async Drafting\nstatus: draft\n---\nUnfinished futures.\n",
    )
    .await;
    let provider = provider_for(dir.path());

    let query = ContentQuery::new()
        .with_search("futures")
        .with_status(ContentStatus::Published);
    let items = provider.get_items_by_query(&query).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Async Rust");
}

#[tokio::test]
async fn locale_filter_and_content_id_group_translations() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "en/about.md", "---\ntitle: About\n---\nen body\n").await;
    write_file(dir.path(), "fr/about.md", "---\ntitle: A propos\n---\nfr body\n").await;
    let mut config = crate::common::config_for(dir.path());
    config.locales = vec!["en".to_string(), "fr".to_string()];
    let provider = mdrepo::provider::ContentProvider::for_filesystem(config).unwrap();

    let french = provider
        .get_items_by_query(&ContentQuery::new().with_locale("fr"))
        .await
        .unwrap();
    assert_eq!(french.len(), 1);
    assert_eq!(french[0].title, "A propos");

    // Both translations share a content id derived from the stripped path.
    let all = provider.get_all_items().await.unwrap();
    let ids: Vec<_> = all.items.iter().map(|i| i.content_id.clone()).collect();
    assert_eq!(ids[0], ids[1]);

    let group = provider
        .get_items_by_query(&{
            let mut q = ContentQuery::new();
            q.content_id = Some(ids[0].clone());
            q
        })
        .await
        .unwrap();
    assert_eq!(group.len(), 2);
}

#[tokio::test]
async fn excluded_globs_never_reach_the_index() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "blog/a.md", "---\ntitle: A\n---\nbody\n").await;
    write_file(dir.path(), "blog/drafts/hidden.md", "---\ntitle: H\n---\nbody\n").await;
    let mut config = crate::common::config_for(dir.path());
    config.exclude = vec!["**/drafts/**".to_string()];
    let provider = mdrepo::provider::ContentProvider::for_filesystem(config).unwrap();

    let snapshot = provider.get_all_items().await.unwrap();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].title, "A");
}
