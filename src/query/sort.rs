//! Stable ordering of query results.

use std::cmp::Ordering;

use crate::models::{ContentItem, SortDirection, SortField};

/// Applies one of the fixed sort keys to a result set.
///
/// The underlying sort is stable: ties keep their input (walk) order, which
/// callers rely on for deterministic pagination.
pub struct ContentSorter;

impl ContentSorter {
    /// Sort `items` in place by `field` and `direction`.
    pub fn apply(items: &mut [&ContentItem], field: SortField, direction: SortDirection) {
        items.sort_by(|a, b| {
            let ordering = compare(a, b, field);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}

fn compare(a: &ContentItem, b: &ContentItem, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        SortField::LastModified => a.modified_at.cmp(&b.modified_at),
        SortField::Created => a.created_at.cmp(&b.created_at),
        SortField::Order => manual_order(a).cmp(&manual_order(b)),
        SortField::PublishDate => a.date.cmp(&b.date),
        SortField::Slug => a.slug.cmp(&b.slug),
        SortField::ReadTime => a.read_time_minutes().cmp(&b.read_time_minutes()),
    }
}

// Manual order comes from the item's front-matter `order` key; items without
// one sort after ordered items, then by publish date among themselves.
fn manual_order(item: &ContentItem) -> (i64, chrono::DateTime<chrono::Utc>) {
    let order = item
        .metadata
        .get("order")
        .and_then(|v| v.as_integer())
        .unwrap_or(i64::MAX);
    (order, item.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataValue;

    fn item(path: &str, title: &str) -> ContentItem {
        let mut item = ContentItem::new("docs", path);
        item.title = title.to_string();
        item
    }

    #[test]
    fn test_title_ascending() {
        let a = item("1.md", "banana");
        let b = item("2.md", "Apple");
        let c = item("3.md", "cherry");
        let mut refs = vec![&a, &b, &c];
        ContentSorter::apply(&mut refs, SortField::Title, SortDirection::Ascending);
        let titles: Vec<_> = refs.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_created_descending_is_stable_on_ties() {
        let stamp = chrono::Utc::now();
        let mut a = item("1.md", "first");
        let mut b = item("2.md", "second");
        let mut c = item("3.md", "third");
        a.created_at = stamp;
        b.created_at = stamp;
        c.created_at = stamp;
        let mut refs = vec![&a, &b, &c];
        ContentSorter::apply(&mut refs, SortField::Created, SortDirection::Descending);
        let titles: Vec<_> = refs.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_manual_order_with_fallback() {
        let mut a = item("1.md", "unordered");
        a.date = "2024-01-01T00:00:00Z".parse().unwrap();
        let mut b = item("2.md", "five");
        b.set_metadata("order", MetadataValue::Integer(5));
        let mut c = item("3.md", "one");
        c.set_metadata("order", MetadataValue::Integer(1));
        let mut refs = vec![&a, &b, &c];
        ContentSorter::apply(&mut refs, SortField::Order, SortDirection::Ascending);
        let titles: Vec<_> = refs.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "five", "unordered"]);
    }

    #[test]
    fn test_read_time_descending() {
        let mut long = item("1.md", "long");
        long.raw_body = "word ".repeat(1000);
        let short = item("2.md", "short");
        let mut refs = vec![&short, &long];
        ContentSorter::apply(&mut refs, SortField::ReadTime, SortDirection::Descending);
        assert_eq!(refs[0].title, "long");
    }
}
