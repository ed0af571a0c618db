//! Lazy AND-composed predicate application over content items.

use crate::models::{ContentItem, ContentQuery};
use crate::utils::path::{normalize_path, parent_directory};

/// Applies a [`ContentQuery`]'s predicates to a candidate sequence.
///
/// The returned iterator is lazy; nothing is materialized until consumed.
/// Every populated predicate narrows the set (logical AND), so the order of
/// predicate evaluation never changes the result.
pub struct ContentFilter;

impl ContentFilter {
    /// Filter `items` by the query's predicates.
    pub fn apply<'a, I>(
        items: I,
        query: &'a ContentQuery,
    ) -> impl Iterator<Item = &'a ContentItem>
    where
        I: IntoIterator<Item = &'a ContentItem>,
        I::IntoIter: 'a,
    {
        items.into_iter().filter(move |item| Self::matches(item, query))
    }

    /// Whether a single item satisfies every populated predicate.
    #[must_use]
    pub fn matches(item: &ContentItem, query: &ContentQuery) -> bool {
        if let Some(directory) = &query.directory {
            if !directory_matches(&item.path, directory) {
                return false;
            }
        }
        if let Some(directory_id) = &query.directory_id {
            if item.directory_id.as_deref() != Some(directory_id.as_str()) {
                return false;
            }
        }
        if let Some(category) = &query.category {
            if !item.has_category(category) {
                return false;
            }
        }
        if !query.categories.is_empty()
            && !query.categories.iter().all(|c| item.has_category(c))
        {
            return false;
        }
        if let Some(tag) = &query.tag {
            if !item.has_tag(tag) {
                return false;
            }
        }
        if !query.tags.is_empty() && !query.tags.iter().all(|t| item.has_tag(t)) {
            return false;
        }
        if let Some(slug) = &query.slug {
            if item.slug != *slug {
                return false;
            }
        }
        if let Some(author) = &query.author {
            if !item.author.eq_ignore_ascii_case(author) {
                return false;
            }
        }
        if let Some(status) = query.status {
            if item.status != status {
                return false;
            }
        }
        if let Some(featured) = query.featured {
            if item.featured != featured {
                return false;
            }
        }
        if let Some(from) = query.date_from {
            if item.date < from {
                return false;
            }
        }
        if let Some(until) = query.date_until {
            if item.date > until {
                return false;
            }
        }
        if let Some(locale) = &query.locale {
            if !item.locale.eq_ignore_ascii_case(locale) {
                return false;
            }
        }
        if let Some(content_id) = &query.content_id {
            if item.content_id != *content_id {
                return false;
            }
        }
        // Single-provider invariant: a snapshot holds one provider's items,
        // so a mismatch here empties the whole result.
        if let Some(provider_id) = &query.provider_id {
            if item.provider_id != *provider_id {
                return false;
            }
        }
        if !query.include_ids.is_empty() && !query.include_ids.contains(item.id()) {
            return false;
        }
        if query.exclude_ids.contains(item.id()) {
            return false;
        }
        if let Some(search) = &query.search {
            if !search_matches(item, search) {
                return false;
            }
        }
        true
    }
}

// Prefix match on the directory portion of the item path, at segment
// boundaries: "blog" matches "blog" and "blog/2024" but not "blogging".
fn directory_matches(item_path: &str, directory: &str) -> bool {
    let item_dir = parent_directory(item_path).to_lowercase();
    let wanted = normalize_path(directory).to_lowercase();
    if wanted.is_empty() {
        return true;
    }
    item_dir == wanted || item_dir.starts_with(&format!("{wanted}/"))
}

// Whitespace-separated terms; ANY term matching ANY searched field counts.
fn search_matches(item: &ContentItem, search: &str) -> bool {
    let title = item.title.to_lowercase();
    let description = item.description.to_lowercase();
    let body = item.raw_body.to_lowercase();
    search.split_whitespace().any(|term| {
        let term = term.to_lowercase();
        title.contains(&term)
            || description.contains(&term)
            || body.contains(&term)
            || item
                .categories()
                .iter()
                .any(|c| c.to_lowercase().contains(&term))
            || item.tags().iter().any(|t| t.to_lowercase().contains(&term))
    })
}
