//! Data model: content items, directories, queries, taxonomy, snapshots.

pub mod directory;
pub mod item;
pub mod query;
pub mod taxonomy;

pub use directory::DirectoryItem;
pub use item::{ContentItem, ContentStatus, MetadataValue};
pub use query::{ContentQuery, SortDirection, SortField};
pub use taxonomy::{ContentCategory, ContentTag, categories_of, tags_of};

use chrono::{DateTime, Utc};

/// An immutable, fully-built content index produced by one load cycle.
///
/// Snapshots are swapped whole behind an `Arc`; readers that captured a
/// reference before a swap keep a consistent view while the next snapshot is
/// built concurrently.
#[derive(Debug, Clone)]
pub struct ContentSnapshot {
    /// All indexed items, in walk order.
    pub items: Vec<ContentItem>,
    /// When this snapshot finished loading.
    pub loaded_at: DateTime<Utc>,
}

impl ContentSnapshot {
    /// Wrap a freshly indexed item list.
    #[must_use]
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            loaded_at: Utc::now(),
        }
    }

    /// Exact-id lookup.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Case-insensitive path lookup.
    #[must_use]
    pub fn by_path(&self, path: &str) -> Option<&ContentItem> {
        let needle = crate::utils::path::normalize_path(path);
        self.items.iter().find(|i| i.path.eq_ignore_ascii_case(&needle))
    }

    /// Case-insensitive URL lookup.
    #[must_use]
    pub fn by_url(&self, url: &str) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.url.eq_ignore_ascii_case(url))
    }
}
