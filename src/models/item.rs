//! Content entities: items, publication status, and typed metadata values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::{RepoError, Result};
use crate::utils::path::{is_valid_slug, normalize_path};
use crate::utils::stable_id;

/// Publication status of a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Not yet published; hidden from published-only queries.
    Draft,
    /// Live content.
    #[default]
    Published,
    /// Retired content kept for reference.
    Archived,
}

impl ContentStatus {
    /// Parse a status value with forgiving casing. Unknown values are `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// A typed scalar stored in the free-form metadata map.
///
/// Unknown front-matter keys are coerced in order bool > int > float >
/// string; already-typed YAML scalars keep their type. Dates appear only for
/// well-known date fields echoed into metadata by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Integer(i64),
    /// Floating-point scalar
    Float(f64),
    /// Timestamp scalar
    Date(DateTime<Utc>),
    /// Plain string (the coercion fallback)
    String(String),
}

impl MetadataValue {
    /// Coerce a raw string: bool > int > float > string, first parse wins.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Self::Float(f);
        }
        Self::String(trimmed.to_string())
    }

    /// Integer view, widening from bool if needed.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// String view for string values only.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view for bool values only.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A single piece of indexed content.
///
/// Items are created during indexing from a source document and replaced
/// wholesale on every rebuild. The id is derived from the provider id and the
/// normalized source path and never changes for a given document. All
/// mutating setters stamp [`modified_at`](Self::modified_at).
///
/// Tag and category sets preserve insertion order and reject duplicates
/// under case-insensitive comparison; mutate them through
/// [`add_tag`](Self::add_tag) / [`add_category`](Self::add_category).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    id: String,
    /// Display title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Short description or summary.
    pub description: String,
    /// Raw markdown body (front matter stripped).
    pub raw_body: String,
    /// Rendered HTML body, when a renderer is injected.
    pub rendered_body: Option<String>,
    /// Locale of this document.
    pub locale: String,
    /// Identifier shared by all locale translations of the same logical item.
    pub content_id: String,
    /// Source-relative normalized path.
    pub path: String,
    /// Canonical URL derived from the path.
    pub url: String,
    /// URL-safe slug (`^[a-z0-9-]+$`).
    pub slug: String,
    /// Creation timestamp (from the source, else indexing time).
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp; stamped by every setter.
    pub modified_at: DateTime<Utc>,
    /// Publish date; defaults to `created_at` when the document sets none.
    pub date: DateTime<Utc>,
    /// Featured flag.
    pub featured: bool,
    /// Optional featured image path or URL.
    pub featured_image: Option<String>,
    /// Publication status.
    pub status: ContentStatus,
    tags: Vec<String>,
    categories: Vec<String>,
    /// Free-form metadata from unrecognized front-matter keys.
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Id of the provider that indexed this item.
    pub provider_id: String,
    /// Id of the containing directory, when known.
    pub directory_id: Option<String>,
}

impl ContentItem {
    /// Create a new item for a source document.
    ///
    /// The id and the default cross-locale `content_id` are both derived from
    /// the normalized path; the processor overrides `content_id` when the
    /// document declares one.
    #[must_use]
    pub fn new(provider_id: &str, path: &str) -> Self {
        let normalized = normalize_path(path);
        let id = stable_id(provider_id, &normalized);
        let now = Utc::now();
        Self {
            id: id.clone(),
            title: String::new(),
            author: String::new(),
            description: String::new(),
            raw_body: String::new(),
            rendered_body: None,
            locale: String::new(),
            content_id: id,
            path: normalized,
            url: String::new(),
            slug: String::new(),
            created_at: now,
            modified_at: now,
            date: now,
            featured: false,
            featured_image: None,
            status: ContentStatus::default(),
            tags: Vec::new(),
            categories: Vec::new(),
            metadata: BTreeMap::new(),
            provider_id: provider_id.to_string(),
            directory_id: None,
        }
    }

    /// Stable identifier, immutable once assigned.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordered tag set.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Ordered category set.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Set the title and stamp the modification time.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Set the author and stamp the modification time.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
        self.touch();
    }

    /// Set the description and stamp the modification time.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    /// Set the publication status and stamp the modification time.
    pub fn set_status(&mut self, status: ContentStatus) {
        self.status = status;
        self.touch();
    }

    /// Set the slug after validating it against `^[a-z0-9-]+$`.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidSlug`] and leaves the item unchanged when
    /// the value is not a valid slug.
    pub fn set_slug(&mut self, slug: impl Into<String>) -> Result<()> {
        let slug = slug.into();
        if !is_valid_slug(&slug) {
            return Err(RepoError::InvalidSlug { slug });
        }
        self.slug = slug;
        self.touch();
        Ok(())
    }

    /// Append a tag, rejecting case-insensitive duplicates silently.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self.tags.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
            self.tags.push(trimmed.to_string());
            self.touch();
        }
    }

    /// Append a category, rejecting case-insensitive duplicates silently.
    pub fn add_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        let trimmed = category.trim();
        if trimmed.is_empty() {
            return;
        }
        if !self.categories.iter().any(|c| c.eq_ignore_ascii_case(trimmed)) {
            self.categories.push(trimmed.to_string());
            self.touch();
        }
    }

    /// Whether the item carries a tag (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether the item carries a category (case-insensitive).
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Store a free-form metadata value and stamp the modification time.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: MetadataValue) {
        self.metadata.insert(key.into(), value);
        self.touch();
    }

    /// Estimated read time in minutes (200 words per minute, minimum 1).
    #[must_use]
    pub fn read_time_minutes(&self) -> u32 {
        let words = self.raw_body.split_whitespace().count();
        (words as u32).div_ceil(200).max(1)
    }

    /// Stamp the last-modified time.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
