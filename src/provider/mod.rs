//! The content provider: orchestrates sources, caches, and the query engine.
//!
//! Capabilities are composed, not inherited: every provider exposes the
//! read-only [`ContentReader`] contract, and providers that can persist
//! documents additionally implement [`ContentWriter`], discovered at runtime
//! through [`ContentReader::as_writer`]. There are no provider base classes
//! and no process-wide state; each [`ContentProvider`] owns its two injected
//! snapshot caches and tears down with the value.

pub mod registry;

pub use registry::ProviderRegistry;

use async_trait::async_trait;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::SnapshotCache;
use crate::config::RepositoryConfig;
use crate::core::{RepoError, Result};
use crate::markdown::{FrontmatterParser, Renderer};
use crate::metadata::MetadataProcessor;
use crate::models::{
    ContentCategory, ContentItem, ContentQuery, ContentSnapshot, ContentTag, DirectoryItem,
    categories_of, tags_of,
};
use crate::query::{ContentFilter, ContentSorter};
use crate::source::{ContentSource, FileSystemSource, SourceFile};
use crate::tree::{DirectoryTree, TreeBuilder};
use crate::utils::path::{file_name, is_markdown, parent_directory, split_locale, url_from_path};
use crate::utils::stable_id;
use crate::watch::{ChangeCallback, ChangeWatcher};

/// Read access to a content repository.
///
/// All methods are safe to call concurrently; reads never block behind a
/// rebuild of the *other* snapshot (content and directory caches hold
/// independent locks), and an in-flight rebuild serves earlier readers the
/// previous snapshot.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Id of this provider.
    fn provider_id(&self) -> &str;

    /// The full content snapshot (loading it on miss or expiry).
    async fn get_all_items(&self) -> Result<Arc<ContentSnapshot>>;

    /// Item by exact id.
    async fn get_item_by_id(&self, id: &str) -> Result<Option<ContentItem>>;

    /// Item by path (case-insensitive).
    async fn get_item_by_path(&self, path: &str) -> Result<Option<ContentItem>>;

    /// Item by URL (case-insensitive).
    async fn get_item_by_url(&self, url: &str) -> Result<Option<ContentItem>>;

    /// Filtered, sorted, paginated query results.
    async fn get_items_by_query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>>;

    /// All categories with usage counts, sorted by name.
    async fn get_categories(&self) -> Result<Vec<ContentCategory>>;

    /// All tags with usage counts, sorted by name.
    async fn get_tags(&self) -> Result<Vec<ContentTag>>;

    /// The directory tree snapshot.
    async fn get_directory_tree(&self) -> Result<Arc<DirectoryTree>>;

    /// Root directories, optionally restricted to one locale.
    async fn get_directories(&self, locale: Option<&str>) -> Result<Vec<DirectoryItem>>;

    /// Directory by exact id.
    async fn get_directory_by_id(&self, id: &str) -> Result<Option<DirectoryItem>>;

    /// Directory by path (case-insensitive).
    async fn get_directory_by_path(&self, path: &str) -> Result<Option<DirectoryItem>>;

    /// Directory by URL (case-insensitive).
    async fn get_directory_by_url(&self, url: &str) -> Result<Option<DirectoryItem>>;

    /// Invalidate both snapshots; the next read reloads lazily.
    async fn refresh_cache(&self) -> Result<()>;

    /// Prepare the source (creating a missing root when configured) and
    /// start the change watcher when enabled.
    async fn initialize(&self) -> Result<()>;

    /// The write capability, when this provider has one.
    fn as_writer(&self) -> Option<&dyn ContentWriter> {
        None
    }
}

/// Write access to a content repository.
///
/// Post-condition of every mutation: both snapshots are invalidated, so the
/// next read observes the change.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Persist an item as a front-matter document at its path.
    async fn save_item(&self, item: &ContentItem) -> Result<()>;

    /// Delete the document at `path`.
    async fn delete_item(&self, path: &str) -> Result<()>;
}

/// A content provider over any [`ContentSource`].
///
/// Composes the source, the metadata pipeline, two independent snapshot
/// caches, and an optional injected markdown renderer. Construct with
/// [`ContentProvider::new`] for an arbitrary source or
/// [`ContentProvider::for_filesystem`] for a local root (which also enables
/// the write capability and the change watcher).
pub struct ContentProvider {
    config: RepositoryConfig,
    source: Arc<dyn ContentSource>,
    renderer: Option<Renderer>,
    parser: FrontmatterParser,
    content_cache: SnapshotCache<ContentSnapshot>,
    directory_cache: SnapshotCache<DirectoryTree>,
    writable_root: Option<PathBuf>,
    shutdown: CancellationToken,
    watcher: Mutex<Option<ChangeWatcher>>,
}

impl std::fmt::Debug for ContentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentProvider")
            .field("provider_id", &self.config.provider_id)
            .field("source", &self.source.name())
            .finish()
    }
}

impl ContentProvider {
    /// Create a provider over an injected source.
    ///
    /// # Errors
    ///
    /// Returns a config error when `config` fails validation.
    pub fn new(config: RepositoryConfig, source: Arc<dyn ContentSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            content_cache: SnapshotCache::new(
                "content",
                config.cache_ttl(),
                config.lock_timeout(),
            ),
            directory_cache: SnapshotCache::new(
                "directories",
                config.cache_ttl(),
                config.lock_timeout(),
            ),
            config,
            source,
            renderer: None,
            parser: FrontmatterParser::new(),
            writable_root: None,
            shutdown: CancellationToken::new(),
            watcher: Mutex::new(None),
        })
    }

    /// Create a provider over the configured local content root.
    ///
    /// Filesystem providers carry the write capability and can run the
    /// change watcher.
    ///
    /// # Errors
    ///
    /// Returns a config error when `config` fails validation and a pattern
    /// error when an exclusion glob is malformed.
    pub fn for_filesystem(config: RepositoryConfig) -> Result<Self> {
        let root = config.expanded_root();
        let source = FileSystemSource::new(root.clone(), &config.exclude)?;
        let mut provider = Self::new(config, Arc::new(source))?;
        provider.writable_root = Some(root);
        Ok(provider)
    }

    /// Inject the markdown renderer used to populate `rendered_body`.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Cancel in-flight walks and stop the watcher.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(watcher) = self.watcher.lock().unwrap_or_else(|e| e.into_inner()).take() {
            watcher.stop();
        }
    }

    // Wrap a non-provider error with this provider's id and the operation.
    fn wrap(&self, operation: &'static str, err: RepoError) -> RepoError {
        match err {
            RepoError::Provider { .. } | RepoError::Cancelled | RepoError::CacheLockTimeout { .. } => err,
            other => RepoError::provider(self.config.provider_id.clone(), operation, other),
        }
    }

    async fn content_snapshot(&self, force_refresh: bool) -> Result<Arc<ContentSnapshot>> {
        self.content_cache
            .get_or_load(force_refresh, || self.load_content_snapshot())
            .await
    }

    async fn directory_snapshot(&self, force_refresh: bool) -> Result<Arc<DirectoryTree>> {
        self.directory_cache
            .get_or_load(force_refresh, || async {
                TreeBuilder::new(&self.config)
                    .build(self.source.as_ref(), &self.shutdown)
                    .await
                    .map_err(|e| self.wrap("load_directories", e))
            })
            .await
    }

    // The indexing walk: list, read concurrently, parse each document
    // independently, skip the ones that fail.
    async fn load_content_snapshot(&self) -> Result<ContentSnapshot> {
        let files = self
            .source
            .list_files(&self.shutdown)
            .await
            .map_err(|e| self.wrap("list_files", e))?;

        let documents: Vec<&SourceFile> = files
            .iter()
            .filter(|f| {
                is_markdown(&f.path)
                    && !file_name(&f.path).eq_ignore_ascii_case(&self.config.index_file)
            })
            .collect();

        let results = join_all(
            documents
                .iter()
                .map(|&file| async move { self.index_document(file).await }),
        )
        .await;

        if self.shutdown.is_cancelled() {
            return Err(RepoError::Cancelled);
        }

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(RepoError::Cancelled) => return Err(RepoError::Cancelled),
                Err(err) => {
                    // One bad document never blocks the index.
                    warn!(provider = %self.config.provider_id, error = %err, "skipping document");
                }
            }
        }

        info!(
            provider = %self.config.provider_id,
            items = items.len(),
            skipped = documents.len() - items.len(),
            "content snapshot loaded"
        );
        Ok(ContentSnapshot::new(items))
    }

    // Turn one source document into a content item.
    async fn index_document(&self, file: &SourceFile) -> Result<ContentItem> {
        let text = self.source.read_file(&file.path).await?;
        let extracted = self.parser.extract(&text, &file.path)?;

        let mut item = ContentItem::new(&self.config.provider_id, &file.path);
        if let Some(created) = file.created {
            item.created_at = created;
            item.date = created;
        }
        item.raw_body = extracted.body;

        let (locale, locale_free_path) = split_locale(
            &file.path,
            &self.config.locales,
            &self.config.default_locale,
        );
        item.locale = locale.to_string();
        // Translations of the same document share the locale-stripped path.
        item.content_id = stable_id(
            &self.config.provider_id,
            &format!("content:{locale_free_path}"),
        );

        if let Some(fields) = &extracted.fields {
            MetadataProcessor::apply_to_item(fields, &mut item)?;
        } else {
            MetadataProcessor::ensure_slug(&mut item);
        }

        item.url = url_from_path(&file.path, &self.config.index_file);
        let parent = parent_directory(&file.path);
        if !parent.is_empty() {
            item.directory_id = Some(stable_id(
                &self.config.provider_id,
                &format!("dir:{parent}"),
            ));
        }
        if let Some(renderer) = &self.renderer {
            item.rendered_body = Some(renderer(&item.raw_body));
        }
        // Source timestamps win over the setter stamps applied above.
        item.modified_at = file.modified.unwrap_or(item.created_at);
        Ok(item)
    }
}

#[async_trait]
impl ContentReader for ContentProvider {
    fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    async fn get_all_items(&self) -> Result<Arc<ContentSnapshot>> {
        self.content_snapshot(false).await
    }

    async fn get_item_by_id(&self, id: &str) -> Result<Option<ContentItem>> {
        let snapshot = self.content_snapshot(false).await?;
        Ok(snapshot.by_id(id).cloned())
    }

    async fn get_item_by_path(&self, path: &str) -> Result<Option<ContentItem>> {
        let snapshot = self.content_snapshot(false).await?;
        Ok(snapshot.by_path(path).cloned())
    }

    async fn get_item_by_url(&self, url: &str) -> Result<Option<ContentItem>> {
        let snapshot = self.content_snapshot(false).await?;
        Ok(snapshot.by_url(url).cloned())
    }

    async fn get_items_by_query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        let snapshot = self.content_snapshot(false).await?;
        let mut matched: Vec<&ContentItem> =
            ContentFilter::apply(snapshot.items.iter(), query).collect();
        ContentSorter::apply(&mut matched, query.sort_field, query.sort_direction);

        let skip = query.skip.unwrap_or(0);
        let take = query.take.unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn get_categories(&self) -> Result<Vec<ContentCategory>> {
        let snapshot = self.content_snapshot(false).await?;
        Ok(categories_of(snapshot.items.iter()))
    }

    async fn get_tags(&self) -> Result<Vec<ContentTag>> {
        let snapshot = self.content_snapshot(false).await?;
        Ok(tags_of(snapshot.items.iter()))
    }

    async fn get_directory_tree(&self) -> Result<Arc<DirectoryTree>> {
        self.directory_snapshot(false).await
    }

    async fn get_directories(&self, locale: Option<&str>) -> Result<Vec<DirectoryItem>> {
        let tree = self.directory_snapshot(false).await?;
        Ok(tree.roots(locale).into_iter().cloned().collect())
    }

    async fn get_directory_by_id(&self, id: &str) -> Result<Option<DirectoryItem>> {
        let tree = self.directory_snapshot(false).await?;
        Ok(tree.get(id).cloned())
    }

    async fn get_directory_by_path(&self, path: &str) -> Result<Option<DirectoryItem>> {
        let tree = self.directory_snapshot(false).await?;
        Ok(tree.get_by_path(path).cloned())
    }

    async fn get_directory_by_url(&self, url: &str) -> Result<Option<DirectoryItem>> {
        let tree = self.directory_snapshot(false).await?;
        Ok(tree.get_by_url(url).cloned())
    }

    async fn refresh_cache(&self) -> Result<()> {
        debug!(provider = %self.config.provider_id, "refreshing caches");
        self.content_cache.invalidate();
        self.directory_cache.invalidate();
        Ok(())
    }

    async fn initialize(&self) -> Result<()> {
        self.source
            .ensure_root(self.config.create_root)
            .await
            .map_err(|e| self.wrap("initialize", e))?;

        if self.config.watch && let Some(root) = &self.writable_root {
            let invalidate = make_invalidator(&self.content_cache, &self.directory_cache);
            let watcher = ChangeWatcher::start(
                root,
                self.config.debounce(),
                invalidate,
                self.shutdown.child_token(),
            )?;
            *self.watcher.lock().unwrap_or_else(|e| e.into_inner()) = Some(watcher);
            info!(provider = %self.config.provider_id, "change watcher enabled");
        }
        Ok(())
    }

    fn as_writer(&self) -> Option<&dyn ContentWriter> {
        self.writable_root.as_ref().map(|_| self as &dyn ContentWriter)
    }
}

#[async_trait]
impl ContentWriter for ContentProvider {
    async fn save_item(&self, item: &ContentItem) -> Result<()> {
        let root = self.writable_root.as_ref().ok_or_else(|| RepoError::Config {
            reason: format!(
                "provider '{}' has no writable root",
                self.config.provider_id
            ),
        })?;
        let front_matter = MetadataProcessor::generate_front_matter(item);
        let document = format!("{front_matter}\n{}", item.raw_body);
        let full = root.join(&item.path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.wrap("save_item", e.into()))?;
        }
        tokio::fs::write(&full, document)
            .await
            .map_err(|e| self.wrap("save_item", e.into()))?;

        // Post-condition: the next read observes the write.
        self.content_cache.invalidate();
        self.directory_cache.invalidate();
        Ok(())
    }

    async fn delete_item(&self, path: &str) -> Result<()> {
        let root = self.writable_root.as_ref().ok_or_else(|| RepoError::Config {
            reason: format!(
                "provider '{}' has no writable root",
                self.config.provider_id
            ),
        })?;
        let full = root.join(crate::utils::path::normalize_path(path));
        tokio::fs::remove_file(&full)
            .await
            .map_err(|e| self.wrap("delete_item", e.into()))?;

        self.content_cache.invalidate();
        self.directory_cache.invalidate();
        Ok(())
    }
}

// Invalidation callback for the watcher. The watcher task must be 'static,
// so it captures shared invalidation handles rather than borrowing the
// provider.
fn make_invalidator(
    content: &SnapshotCache<ContentSnapshot>,
    directories: &SnapshotCache<DirectoryTree>,
) -> ChangeCallback {
    let content = content.invalidation_handle();
    let directories = directories.invalidation_handle();
    Arc::new(move || {
        content.invalidate();
        directories.invalidate();
    })
}
