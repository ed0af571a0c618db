//! Directory hierarchy: an id-addressed arena of directory nodes and the
//! builder that assembles it from a source listing.
//!
//! Nodes reference each other by stable id instead of live pointers, so the
//! cycle check is an id-membership walk up the ancestor chain and snapshots
//! stay trivially cloneable. The whole tree is replaced on every rebuild;
//! there is no incremental mutation across rebuilds.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RepositoryConfig;
use crate::core::{RepoError, Result};
use crate::markdown::FrontmatterParser;
use crate::metadata::MetadataProcessor;
use crate::models::DirectoryItem;
use crate::source::{ContentSource, directories_from_files};
use crate::utils::path::{is_markdown, normalize_path, parent_directory, split_locale};
use crate::utils::stable_id;

/// An immutable forest of directories produced by one load cycle.
///
/// Nodes are owned by the arena and addressed by id; parent/child edges are
/// id references validated against cycles on every mutation.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    nodes: HashMap<String, DirectoryItem>,
    roots: Vec<String>,
    by_path: HashMap<String, String>,
    /// When this tree finished loading.
    pub loaded_at: DateTime<Utc>,
}

impl DirectoryTree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaded_at: Utc::now(),
            ..Self::default()
        }
    }

    /// Number of directories in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no directories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node as a root (parentless) directory.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Validation`] when a node with the same path (case
    /// insensitive) already exists; paths are unique within a snapshot.
    pub fn insert(&mut self, directory: DirectoryItem) -> Result<String> {
        let key = directory.path.to_lowercase();
        if self.by_path.contains_key(&key) {
            return Err(RepoError::Validation {
                field: "path",
                reason: format!("duplicate directory path '{}'", directory.path),
            });
        }
        let id = directory.id().to_string();
        self.by_path.insert(key, id.clone());
        self.roots.push(id.clone());
        self.nodes.insert(id.clone(), directory);
        Ok(id)
    }

    /// Node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DirectoryItem> {
        self.nodes.get(id)
    }

    /// Node by path (case-insensitive).
    #[must_use]
    pub fn get_by_path(&self, path: &str) -> Option<&DirectoryItem> {
        let key = normalize_path(path).to_lowercase();
        self.by_path.get(&key).and_then(|id| self.nodes.get(id))
    }

    /// Node by URL (case-insensitive linear scan).
    #[must_use]
    pub fn get_by_url(&self, url: &str) -> Option<&DirectoryItem> {
        self.nodes.values().find(|d| d.url.eq_ignore_ascii_case(url))
    }

    /// Root directories, optionally restricted to one locale.
    ///
    /// With a locale, only root-level matches (and therefore their same-locale
    /// subtrees) are returned; without one, the whole forest.
    #[must_use]
    pub fn roots(&self, locale: Option<&str>) -> Vec<&DirectoryItem> {
        self.roots
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|dir| match locale {
                Some(locale) => dir.locale.eq_ignore_ascii_case(locale),
                None => true,
            })
            .collect()
    }

    /// Iterate over all nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryItem> {
        self.nodes.values()
    }

    /// Make `child_id` a child of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::DirectoryCycle`] when `parent_id` already has
    /// `child_id` in its ancestor chain (or is the child itself); the tree is
    /// left unchanged. Returns [`RepoError::Validation`] for unknown ids.
    pub fn add_child(&mut self, parent_id: &str, child_id: &str) -> Result<()> {
        self.ensure_known(parent_id)?;
        self.ensure_known(child_id)?;
        if parent_id == child_id || self.is_ancestor(child_id, parent_id) {
            let directory = self.nodes[child_id].path.clone();
            let ancestor = self.nodes[parent_id].path.clone();
            return Err(RepoError::DirectoryCycle {
                directory,
                ancestor,
            });
        }

        self.detach(child_id);
        if let Some(parent) = self.nodes.get_mut(parent_id)
            && !parent.children.iter().any(|c| c == child_id)
        {
            parent.children.push(child_id.to_string());
        }
        if let Some(child) = self.nodes.get_mut(child_id) {
            child.parent = Some(parent_id.to_string());
        }
        Ok(())
    }

    /// Re-parent `child_id` under `parent_id`, or detach it into a root when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Same rejection rules as [`add_child`](Self::add_child).
    pub fn set_parent(&mut self, child_id: &str, parent_id: Option<&str>) -> Result<()> {
        match parent_id {
            Some(parent_id) => self.add_child(parent_id, child_id),
            None => {
                self.ensure_known(child_id)?;
                self.detach(child_id);
                if let Some(child) = self.nodes.get_mut(child_id) {
                    child.parent = None;
                }
                if !self.roots.iter().any(|r| r == child_id) {
                    self.roots.push(child_id.to_string());
                }
                Ok(())
            }
        }
    }

    /// Record that a content item lives directly in `directory_id`.
    pub fn attach_item(&mut self, directory_id: &str, item_id: impl Into<String>) {
        if let Some(dir) = self.nodes.get_mut(directory_id) {
            let item_id = item_id.into();
            if !dir.item_ids.iter().any(|i| *i == item_id) {
                dir.item_ids.push(item_id);
            }
        }
    }

    /// Sort roots and every child list by manual order, then name.
    pub fn sort(&mut self) {
        let key = |tree: &Self, id: &String| {
            tree.nodes
                .get(id)
                .map(|d| (d.order, d.name.to_lowercase()))
                .unwrap_or((i64::MAX, String::new()))
        };
        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_key(|id| key(self, id));
        self.roots = roots;

        let ids: Vec<String> = self.nodes.keys().cloned().collect();
        for id in ids {
            let mut children = match self.nodes.get_mut(&id) {
                Some(node) => std::mem::take(&mut node.children),
                None => continue,
            };
            children.sort_by_key(|id| key(self, id));
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children = children;
            }
        }
    }

    // Whether `candidate` appears in the ancestor chain of `node`.
    fn is_ancestor(&self, candidate: &str, node: &str) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent.as_deref());
        while let Some(ancestor) = current {
            if ancestor == candidate {
                return true;
            }
            current = self.nodes.get(ancestor).and_then(|n| n.parent.as_deref());
        }
        false
    }

    // Remove a node from its current parent's child list or the root list.
    fn detach(&mut self, id: &str) {
        let old_parent = self.nodes.get(id).and_then(|n| n.parent.clone());
        match old_parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|c| c != id);
                }
            }
            None => self.roots.retain(|r| r != id),
        }
    }

    fn ensure_known(&self, id: &str) -> Result<()> {
        if self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(RepoError::Validation {
                field: "directory_id",
                reason: format!("unknown directory id '{id}'"),
            })
        }
    }
}

/// Assembles a [`DirectoryTree`] from a content source.
pub struct TreeBuilder<'a> {
    config: &'a RepositoryConfig,
    parser: FrontmatterParser,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for the given configuration.
    #[must_use]
    pub fn new(config: &'a RepositoryConfig) -> Self {
        Self {
            config,
            parser: FrontmatterParser::new(),
        }
    }

    /// Walk `source` and build the directory forest.
    ///
    /// Directories are created parents-first, linked through the arena's
    /// cycle-checked edges, annotated from their index document when one
    /// exists, and populated with the ids of the markdown documents they
    /// directly contain. A malformed index document is logged and skipped;
    /// it never aborts the walk.
    ///
    /// # Errors
    ///
    /// Returns the source's listing error, or [`RepoError::Cancelled`] when
    /// the token fires mid-walk.
    pub async fn build(
        &self,
        source: &dyn ContentSource,
        cancel: &CancellationToken,
    ) -> Result<DirectoryTree> {
        let files = source.list_files(cancel).await?;
        let mut dir_paths = source.list_directories(cancel).await?;
        // Backends that cannot see empty directories still yield every
        // ancestor of a listed file.
        for derived in directories_from_files(&files) {
            if !dir_paths.iter().any(|d| d.eq_ignore_ascii_case(&derived)) {
                dir_paths.push(derived);
            }
        }
        dir_paths.sort();

        let file_paths: std::collections::HashSet<String> =
            files.iter().map(|f| f.path.to_lowercase()).collect();

        let mut tree = DirectoryTree::new();
        for dir_path in &dir_paths {
            if cancel.is_cancelled() {
                return Err(RepoError::Cancelled);
            }
            let mut directory = DirectoryItem::new(&self.config.provider_id, dir_path);
            let (locale, _) = split_locale(
                dir_path,
                &self.config.locales,
                &self.config.default_locale,
            );
            directory.locale = locale.to_string();

            let index_path = format!("{dir_path}/{}", self.config.index_file);
            if file_paths.contains(&index_path.to_lowercase()) {
                self.apply_index_document(source, &index_path, &mut directory).await;
            }

            let id = match tree.insert(directory) {
                Ok(id) => id,
                Err(err) => {
                    warn!(path = %dir_path, error = %err, "skipping duplicate directory");
                    continue;
                }
            };
            let parent_path = parent_directory(dir_path);
            if !parent_path.is_empty()
                && let Some(parent_id) = tree.get_by_path(&parent_path).map(|d| d.id().to_string())
            {
                // Sorted paths guarantee the parent was inserted first.
                tree.add_child(&parent_id, &id)?;
            }
        }

        for file in &files {
            let name = crate::utils::path::file_name(&file.path);
            if !is_markdown(&file.path) || name.eq_ignore_ascii_case(&self.config.index_file) {
                continue;
            }
            let parent_path = parent_directory(&file.path);
            if parent_path.is_empty() {
                continue; // root-level documents have no directory
            }
            if let Some(dir_id) = tree.get_by_path(&parent_path).map(|d| d.id().to_string()) {
                tree.attach_item(&dir_id, stable_id(&self.config.provider_id, &file.path));
            }
        }

        tree.sort();
        debug!(directories = tree.len(), "directory tree built");
        Ok(tree)
    }

    async fn apply_index_document(
        &self,
        source: &dyn ContentSource,
        index_path: &str,
        directory: &mut DirectoryItem,
    ) {
        let content = match source.read_file(index_path).await {
            Ok(content) => content,
            Err(err) => {
                warn!(path = index_path, error = %err, "skipping unreadable index document");
                return;
            }
        };
        match self.parser.extract(&content, index_path) {
            Ok(extracted) => {
                if let Some(fields) = extracted.fields {
                    MetadataProcessor::apply_to_directory(&fields, directory);
                }
            }
            Err(err) => {
                warn!(path = index_path, error = %err, "skipping malformed index document");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(paths: &[&str]) -> (DirectoryTree, Vec<String>) {
        let mut tree = DirectoryTree::new();
        let mut ids = Vec::new();
        for path in paths {
            let dir = DirectoryItem::new("docs", path);
            ids.push(tree.insert(dir).unwrap());
        }
        (tree, ids)
    }

    #[test]
    fn test_cycle_rejected_via_add_child() {
        let (mut tree, ids) = tree_with(&["a", "a/b", "a/b/c"]);
        tree.add_child(&ids[0], &ids[1]).unwrap();
        tree.add_child(&ids[1], &ids[2]).unwrap();

        // C.add_child(A) must fail and leave the tree unchanged.
        let err = tree.add_child(&ids[2], &ids[0]).unwrap_err();
        assert!(matches!(err, RepoError::DirectoryCycle { .. }));
        assert_eq!(tree.get(&ids[0]).unwrap().parent_id(), None);
        assert_eq!(tree.get(&ids[2]).unwrap().child_ids().len(), 0);
    }

    #[test]
    fn test_cycle_rejected_via_set_parent() {
        let (mut tree, ids) = tree_with(&["a", "a/b", "a/b/c"]);
        tree.add_child(&ids[0], &ids[1]).unwrap();
        tree.add_child(&ids[1], &ids[2]).unwrap();

        let err = tree.set_parent(&ids[0], Some(&ids[2])).unwrap_err();
        assert!(matches!(err, RepoError::DirectoryCycle { .. }));
        // A stays a root.
        assert!(tree.roots(None).iter().any(|d| d.id() == ids[0]));
    }

    #[test]
    fn test_self_parent_rejected() {
        let (mut tree, ids) = tree_with(&["a"]);
        assert!(tree.add_child(&ids[0], &ids[0]).is_err());
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut tree = DirectoryTree::new();
        tree.insert(DirectoryItem::new("docs", "blog")).unwrap();
        let err = tree.insert(DirectoryItem::new("docs", "Blog")).unwrap_err();
        assert!(matches!(err, RepoError::Validation { .. }));
    }

    #[test]
    fn test_reparent_moves_node() {
        let (mut tree, ids) = tree_with(&["a", "b", "b/c"]);
        tree.add_child(&ids[1], &ids[2]).unwrap();
        assert_eq!(tree.roots(None).len(), 2);

        tree.set_parent(&ids[2], Some(&ids[0])).unwrap();
        assert_eq!(tree.get(&ids[2]).unwrap().parent_id(), Some(ids[0].as_str()));
        assert!(tree.get(&ids[1]).unwrap().child_ids().is_empty());

        tree.set_parent(&ids[2], None).unwrap();
        assert_eq!(tree.roots(None).len(), 3);
    }

    #[test]
    fn test_locale_filtered_roots() {
        let mut tree = DirectoryTree::new();
        let mut en = DirectoryItem::new("docs", "en");
        en.locale = "en".to_string();
        let mut fr = DirectoryItem::new("docs", "fr");
        fr.locale = "fr".to_string();
        tree.insert(en).unwrap();
        tree.insert(fr).unwrap();

        assert_eq!(tree.roots(None).len(), 2);
        let filtered = tree.roots(Some("fr"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, "fr");
    }

    #[test]
    fn test_attach_item_dedups() {
        let (mut tree, ids) = tree_with(&["blog"]);
        tree.attach_item(&ids[0], "item-1");
        tree.attach_item(&ids[0], "item-1");
        assert_eq!(tree.get(&ids[0]).unwrap().item_ids(), &["item-1".to_string()]);
    }
}
