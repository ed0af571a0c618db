//! mdrepo - Markdown content repository
//!
//! A content repository layer for CMS backends: discovers markdown documents
//! (from a local filesystem or a remote git-hosted source), parses their
//! front matter into structured entities, builds queryable in-memory
//! snapshots, and serves reads through caches that stay consistent under
//! concurrent access and partial failures.
//!
//! # Architecture Overview
//!
//! Requests flow through one orchestrator:
//! - [`provider::ContentProvider`] answers the read contract
//!   ([`provider::ContentReader`]): lookups by id/path/URL, structured
//!   queries, taxonomy projections, directory trees, refresh.
//! - [`cache::SnapshotCache`] owns the authoritative snapshot per concern
//!   (content and directories cache independently): double-checked rebuild
//!   collapse, TTL expiry, bounded lock acquisition, stale-on-error
//!   fallback.
//! - [`tree::TreeBuilder`] walks a [`source::ContentSource`] into a
//!   cycle-free, id-addressed directory forest; [`metadata`] applies the
//!   front-matter field mapping to items and directories.
//! - [`query`] filters (lazy, AND-composed) and sorts (stable) the snapshot.
//!
//! Snapshots are immutable and swapped whole behind `Arc`s: readers that
//! captured a reference keep a consistent view while the next snapshot is
//! built. A failed refresh of a populated cache logs and serves the stale
//! snapshot; only a never-loaded cache surfaces the provider error.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdrepo::config::RepositoryConfig;
//! use mdrepo::models::ContentQuery;
//! use mdrepo::provider::{ContentProvider, ContentReader};
//!
//! # async fn example() -> mdrepo::Result<()> {
//! let config = RepositoryConfig {
//!     provider_id: "docs".to_string(),
//!     root: "~/content".to_string(),
//!     create_root: true,
//!     ..Default::default()
//! };
//! let provider = ContentProvider::for_filesystem(config)?;
//! provider.initialize().await?;
//!
//! let posts = provider
//!     .get_items_by_query(&ContentQuery::new().with_directory("blog").with_tag("rust"))
//!     .await?;
//! for post in posts {
//!     println!("{} -> {}", post.title, post.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Core Modules
//!
//! - [`cache`] - snapshot memoization with single-rebuild collapse
//! - [`config`] - TOML repository configuration
//! - [`core`] - error taxonomy and result alias
//! - [`markdown`] - front-matter extraction and the renderer seam
//! - [`metadata`] - front-matter field mapping and generation
//! - [`models`] - content items, directories, queries, taxonomy
//! - [`pattern`] - glob matching for discovery and exclusion
//! - [`provider`] - the orchestrator, writer capability, and registry
//! - [`query`] - filtering and sorting
//! - [`source`] - filesystem and remote content sources
//! - [`tree`] - directory arena and tree builder
//! - [`watch`] - debounced filesystem change watching

pub mod cache;
pub mod config;
pub mod core;
pub mod logging;
pub mod markdown;
pub mod metadata;
pub mod models;
pub mod pattern;
pub mod provider;
pub mod query;
pub mod source;
pub mod tree;
pub mod utils;
pub mod watch;

pub use crate::core::{RepoError, Result};
pub use models::{ContentItem, ContentQuery, ContentSnapshot, ContentStatus, DirectoryItem};
pub use provider::{ContentProvider, ContentReader, ContentWriter, ProviderRegistry};
