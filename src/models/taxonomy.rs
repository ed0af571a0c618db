//! Derived taxonomy projections: categories and tags with usage counts.
//!
//! Neither is stored; both are computed on demand from the current item
//! snapshot by grouping names case-insensitively. The first-seen casing wins
//! for display, the slug is derived from it, and results sort by name.

use serde::{Deserialize, Serialize};

use crate::models::ContentItem;
use crate::utils::path::slugify;

/// A content category with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCategory {
    /// Display name (first-seen casing).
    pub name: String,
    /// URL-safe slug derived from the name.
    pub slug: String,
    /// Number of items carrying this category.
    pub count: usize,
}

/// A content tag with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTag {
    /// Display name (first-seen casing).
    pub name: String,
    /// URL-safe slug derived from the name.
    pub slug: String,
    /// Number of items carrying this tag.
    pub count: usize,
}

/// Group the categories of `items` case-insensitively, sorted by name.
#[must_use]
pub fn categories_of<'a, I>(items: I) -> Vec<ContentCategory>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    group_names(items.into_iter().flat_map(|i| i.categories().iter()))
        .into_iter()
        .map(|(name, count)| ContentCategory {
            slug: slugify(&name),
            name,
            count,
        })
        .collect()
}

/// Group the tags of `items` case-insensitively, sorted by name.
#[must_use]
pub fn tags_of<'a, I>(items: I) -> Vec<ContentTag>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    group_names(items.into_iter().flat_map(|i| i.tags().iter()))
        .into_iter()
        .map(|(name, count)| ContentTag {
            slug: slugify(&name),
            name,
            count,
        })
        .collect()
}

// Case-insensitive grouping that remembers the first-seen casing; the output
// is (name, count) sorted by name.
fn group_names<'a, I>(names: I) -> Vec<(String, usize)>
where
    I: Iterator<Item = &'a String>,
{
    let mut groups: Vec<(String, usize)> = Vec::new();
    for name in names {
        match groups.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, count)) => *count += 1,
            None => groups.push((name.clone(), 1)),
        }
    }
    groups.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()));
    groups
}
