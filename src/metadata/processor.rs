//! Applies front-matter fields to content and directory entities.
//!
//! The processor owns the closed set of well-known keys, the typed coercion
//! for everything else, and the inverse operation (front-matter generation).
//! It never catches: a malformed slug or date is returned to the caller,
//! which decides whether to skip the document (bulk walk) or surface the
//! error (single mutation).

use chrono::{DateTime, NaiveDate, Utc};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::core::Result;
use crate::models::{ContentItem, ContentStatus, DirectoryItem, MetadataValue};
use crate::utils::path::slugify;

/// Applies parsed front-matter fields to entities and generates front matter
/// back from items.
///
/// Well-known content keys: `title`, `author`, `date`, `description`,
/// `tags`, `categories`/`category`, `slug`, `featured`/`is_featured`,
/// `featured_image`, `content_id`/`localization_id`, `locale`/`language`,
/// `status`. Well-known directory keys: `name`/`title`, `description`,
/// `order`. Anything else lands in the free-form metadata map with
/// best-effort coercion (bool > int > float > string).
pub struct MetadataProcessor;

impl MetadataProcessor {
    /// Apply front-matter fields to a content item.
    ///
    /// List-valued keys accept YAML sequences, bracketed `[a, b]` strings, or
    /// comma/semicolon-separated scalars; surrounding quotes are stripped per
    /// element. After all keys are applied, an empty slug is derived from the
    /// title (`"untitled"` when that too is empty).
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidSlug`](crate::RepoError::InvalidSlug) when
    /// the document declares a slug that does not match `^[a-z0-9-]+$`.
    pub fn apply_to_item(fields: &Mapping, item: &mut ContentItem) -> Result<()> {
        for (key, value) in fields {
            let Some(key) = key.as_str() else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                "title" => item.set_title(scalar_string(value)),
                "author" => item.set_author(scalar_string(value)),
                "description" => item.set_description(scalar_string(value)),
                "date" => {
                    if let Some(date) = parse_date(&scalar_string(value)) {
                        item.date = date;
                    } else {
                        debug!(value = %scalar_string(value), "ignoring unparseable date");
                    }
                }
                "tags" => {
                    for tag in list_values(value) {
                        item.add_tag(tag);
                    }
                }
                "categories" | "category" => {
                    for category in list_values(value) {
                        item.add_category(category);
                    }
                }
                "slug" => item.set_slug(scalar_string(value))?,
                "featured" | "is_featured" => item.featured = scalar_bool(value),
                "featured_image" => {
                    let image = scalar_string(value);
                    item.featured_image = (!image.is_empty()).then_some(image);
                }
                "content_id" | "localization_id" => item.content_id = scalar_string(value),
                "locale" | "language" => item.locale = scalar_string(value),
                "status" => {
                    let raw = scalar_string(value);
                    match ContentStatus::parse(&raw) {
                        Some(status) => item.set_status(status),
                        None => debug!(value = %raw, "ignoring unknown status"),
                    }
                }
                _ => {
                    // Unknown keys keep their original casing.
                    item.set_metadata(key.to_string(), coerce_value(value));
                }
            }
        }
        Self::ensure_slug(item);
        Ok(())
    }

    /// Apply index-document fields to a directory entity.
    pub fn apply_to_directory(fields: &Mapping, directory: &mut DirectoryItem) {
        for (key, value) in fields {
            let Some(key) = key.as_str() else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                "name" | "title" => directory.name = scalar_string(value),
                "description" => directory.description = scalar_string(value),
                "order" => {
                    if let Some(order) = coerce_value(value).as_integer() {
                        directory.order = order;
                    }
                }
                _ => {
                    directory
                        .metadata
                        .insert(key.to_string(), coerce_value(value));
                }
            }
        }
    }

    /// Derive a slug from the title when the document set none.
    pub fn ensure_slug(item: &mut ContentItem) {
        if item.slug.is_empty() {
            let derived = slugify(&item.title);
            // slugify output always satisfies the slug invariant
            item.set_slug(derived).expect("derived slug is valid");
        }
    }

    /// Serialize an item's well-known fields and custom metadata back into a
    /// front-matter block (delimiters included).
    ///
    /// Extracting the result and applying it to a fresh item reproduces the
    /// scalar fields and the tag/category set membership (list order is not
    /// guaranteed).
    #[must_use]
    pub fn generate_front_matter(item: &ContentItem) -> String {
        let mut fields = Mapping::new();
        fields.insert("title".into(), item.title.clone().into());
        if !item.author.is_empty() {
            fields.insert("author".into(), item.author.clone().into());
        }
        if !item.description.is_empty() {
            fields.insert("description".into(), item.description.clone().into());
        }
        fields.insert("date".into(), item.date.to_rfc3339().into());
        fields.insert("slug".into(), item.slug.clone().into());
        if item.featured {
            fields.insert("featured".into(), true.into());
        }
        if let Some(image) = &item.featured_image {
            fields.insert("featured_image".into(), image.clone().into());
        }
        fields.insert("content_id".into(), item.content_id.clone().into());
        if !item.locale.is_empty() {
            fields.insert("locale".into(), item.locale.clone().into());
        }
        fields.insert("status".into(), item.status.to_string().into());
        if !item.tags().is_empty() {
            let tags: Vec<Value> = item.tags().iter().map(|t| t.clone().into()).collect();
            fields.insert("tags".into(), Value::Sequence(tags));
        }
        if !item.categories().is_empty() {
            let categories: Vec<Value> =
                item.categories().iter().map(|c| c.clone().into()).collect();
            fields.insert("categories".into(), Value::Sequence(categories));
        }
        for (key, value) in &item.metadata {
            fields.insert(key.clone().into(), metadata_to_yaml(value));
        }

        let yaml = serde_yaml::to_string(&fields).unwrap_or_default();
        format!("---\n{yaml}---\n")
    }
}

// A scalar field rendered as a trimmed string with surrounding quotes removed.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => strip_quotes(s.trim()).to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn scalar_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

// List-valued keys accept a YAML sequence, a bracketed "[a, b]" string, or a
// comma/semicolon-separated scalar string.
fn list_values(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(seq) => seq
            .iter()
            .map(scalar_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            let inner = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(trimmed);
            inner
                .split([',', ';'])
                .map(|part| strip_quotes(part.trim()).to_string())
                .filter(|part| !part.is_empty())
                .collect()
        }
        _ => Vec::new(),
    }
}

fn strip_quotes(s: &str) -> &str {
    let stripped = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')));
    stripped.unwrap_or(s)
}

// Typed scalars keep their YAML type; strings go through the coercion ladder
// (bool > int > float > string). Non-scalars flatten to their YAML text.
fn coerce_value(value: &Value) -> MetadataValue {
    match value {
        Value::Bool(b) => MetadataValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else {
                MetadataValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => MetadataValue::coerce(strip_quotes(s.trim())),
        other => MetadataValue::String(
            serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
        ),
    }
}

fn metadata_to_yaml(value: &MetadataValue) -> Value {
    match value {
        MetadataValue::Bool(b) => (*b).into(),
        MetadataValue::Integer(i) => (*i).into(),
        MetadataValue::Float(f) => (*f).into(),
        MetadataValue::Date(d) => d.to_rfc3339().into(),
        MetadataValue::String(s) => s.clone().into(),
    }
}

// Accepts RFC 3339 and bare YYYY-MM-DD dates.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
