//! Structured query specification for content lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::ContentStatus;

/// Sort key for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Item title (case-insensitive)
    Title,
    /// Author name (case-insensitive)
    Author,
    /// Last modification time
    LastModified,
    /// Creation time (the default)
    #[default]
    Created,
    /// Manual order index (front-matter `order` key, publish date fallback)
    Order,
    /// Publish date
    PublishDate,
    /// Slug
    Slug,
    /// Estimated read time
    ReadTime,
}

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first (the default)
    #[default]
    Descending,
}

/// An immutable filter/sort/paging specification.
///
/// Every populated predicate narrows the candidate set (logical AND); unset
/// fields do not constrain. Build one with [`ContentQuery::new`] and the
/// `with_*` methods:
///
/// ```
/// use mdrepo::models::{ContentQuery, SortField, SortDirection};
///
/// let query = ContentQuery::new()
///     .with_directory("blog")
///     .with_tag("rust")
///     .with_sort(SortField::PublishDate, SortDirection::Descending)
///     .with_page(0, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentQuery {
    /// Directory path prefix (normalized, case-insensitive).
    pub directory: Option<String>,
    /// Exact directory id.
    pub directory_id: Option<String>,
    /// Single category (case-insensitive membership).
    pub category: Option<String>,
    /// All of these categories must be present.
    pub categories: Vec<String>,
    /// Single tag (case-insensitive membership).
    pub tag: Option<String>,
    /// All of these tags must be present.
    pub tags: Vec<String>,
    /// Exact slug.
    pub slug: Option<String>,
    /// Author (case-insensitive).
    pub author: Option<String>,
    /// Publication status.
    pub status: Option<ContentStatus>,
    /// Featured flag.
    pub featured: Option<bool>,
    /// Publish date lower bound (inclusive).
    pub date_from: Option<DateTime<Utc>>,
    /// Publish date upper bound (inclusive).
    pub date_until: Option<DateTime<Utc>>,
    /// Free-text search over title, description, body, categories, and tags.
    pub search: Option<String>,
    /// Locale filter.
    pub locale: Option<String>,
    /// Cross-locale content id (localization group).
    pub content_id: Option<String>,
    /// Whitelist of item ids.
    pub include_ids: HashSet<String>,
    /// Item ids to remove from the result.
    pub exclude_ids: HashSet<String>,
    /// Owning provider id (single-provider invariant).
    pub provider_id: Option<String>,
    /// Sort key.
    pub sort_field: SortField,
    /// Sort direction.
    pub sort_direction: SortDirection,
    /// Number of leading results to skip.
    pub skip: Option<usize>,
    /// Maximum number of results to return.
    pub take: Option<usize>,
}

impl ContentQuery {
    /// An unconstrained query (everything, Created descending).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain to a directory path prefix.
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Constrain to a single tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Require all of the given tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Constrain to a single category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Require all of the given categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Constrain to a publication status.
    #[must_use]
    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Constrain to a locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Free-text search terms (whitespace separated, ANY-term match).
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Constrain publish dates to `[from, until]` (either bound optional).
    #[must_use]
    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_from = from;
        self.date_until = until;
        self
    }

    /// Set the sort key and direction.
    #[must_use]
    pub fn with_sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = field;
        self.sort_direction = direction;
        self
    }

    /// Set skip/take pagination.
    #[must_use]
    pub fn with_page(mut self, skip: usize, take: usize) -> Self {
        self.skip = Some(skip);
        self.take = Some(take);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_created_descending() {
        let query = ContentQuery::new();
        assert_eq!(query.sort_field, SortField::Created);
        assert_eq!(query.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn test_builder_chain() {
        let query = ContentQuery::new()
            .with_directory("blog")
            .with_tags(["a", "b"])
            .with_page(2, 3);
        assert_eq!(query.directory.as_deref(), Some("blog"));
        assert_eq!(query.tags.len(), 2);
        assert_eq!(query.skip, Some(2));
        assert_eq!(query.take, Some(3));
    }
}
