//! Directory entities: nodes of the content hierarchy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::MetadataValue;
use crate::utils::path::{directory_url, file_name, normalize_path};
use crate::utils::stable_id;

/// A node in the content hierarchy.
///
/// Directories are created while walking the source tree and replaced
/// wholesale on every cache rebuild. Parent and child edges are stored as id
/// references into the owning [`DirectoryTree`](crate::tree::DirectoryTree)
/// arena, never as live pointers, and are only mutated through the arena's
/// cycle-checked `add_child` / `set_parent` operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryItem {
    id: String,
    /// Source-relative normalized path; unique within a provider snapshot.
    pub path: String,
    /// Display name; defaults to the final path segment.
    pub name: String,
    /// Optional description from the directory's index document.
    pub description: String,
    /// Canonical URL of the directory.
    pub url: String,
    /// Locale of this subtree.
    pub locale: String,
    /// Manual ordering index from the index document (0 when unset).
    pub order: i64,
    /// Free-form metadata from unrecognized index-document keys.
    pub metadata: BTreeMap<String, MetadataValue>,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<String>,
    pub(crate) item_ids: Vec<String>,
}

impl DirectoryItem {
    /// Create a directory node for a source path.
    #[must_use]
    pub fn new(provider_id: &str, path: &str) -> Self {
        let normalized = normalize_path(path);
        let name = if normalized.is_empty() {
            String::new()
        } else {
            file_name(&normalized)
        };
        Self {
            id: stable_id(provider_id, &format!("dir:{normalized}")),
            url: directory_url(&normalized),
            path: normalized,
            name,
            description: String::new(),
            locale: String::new(),
            order: 0,
            metadata: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            item_ids: Vec::new(),
        }
    }

    /// Stable identifier, immutable once assigned.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the parent directory, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Ids of child directories, in walk order.
    #[must_use]
    pub fn child_ids(&self) -> &[String] {
        &self.children
    }

    /// Ids of the content items contained directly in this directory.
    ///
    /// Items are referenced, not owned; resolve them against the content
    /// snapshot.
    #[must_use]
    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    /// Whether this is a root-level directory.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
