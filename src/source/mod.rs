//! Content sources: where documents come from.
//!
//! A [`ContentSource`] abstracts "a tree of UTF-8 documents with
//! timestamps": the local filesystem ([`FileSystemSource`]) or a remote
//! git-hosted repository ([`RemoteSource`], which adapts a consumed
//! [`RemoteRepositoryClient`]; the HTTP client itself lives outside this
//! crate). Sources hand out normalized source-relative paths; exclusion
//! globs are applied during the walk so pruned subtrees are never listed.

pub mod filesystem;
pub mod remote;

pub use filesystem::FileSystemSource;
pub use remote::{RemoteCommit, RemoteEntry, RemoteRepositoryClient, RemoteSource};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::core::Result;

/// A document listed by a source.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Normalized source-relative path.
    pub path: String,
    /// Creation timestamp, when the backend can provide one.
    pub created: Option<DateTime<Utc>>,
    /// Last-modification timestamp, when the backend can provide one.
    pub modified: Option<DateTime<Utc>>,
}

/// A tree of content documents.
///
/// Implementations apply the configured exclusion globs during listing and
/// check the cancellation token between entries so a long walk aborts
/// promptly. All paths are normalized and source-relative.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable source name used in error context.
    fn name(&self) -> &str;

    /// List every file under the root, exclusions applied.
    async fn list_files(&self, cancel: &CancellationToken) -> Result<Vec<SourceFile>>;

    /// List every directory under the root (the root itself excluded),
    /// exclusions applied. Backends that cannot see empty directories derive
    /// the listing from file paths.
    async fn list_directories(&self, cancel: &CancellationToken) -> Result<Vec<String>>;

    /// Read a file as UTF-8 text.
    async fn read_file(&self, path: &str) -> Result<String>;

    /// Verify the source root exists, creating it when `create` is set and
    /// the backend supports creation.
    async fn ensure_root(&self, create: bool) -> Result<()>;
}

/// Derive the directory listing from a set of file paths.
///
/// Every ancestor of every file becomes a directory, deduplicated and sorted
/// so parents precede children.
#[must_use]
pub fn directories_from_files(files: &[SourceFile]) -> Vec<String> {
    let mut dirs = std::collections::BTreeSet::new();
    for file in files {
        let mut current = crate::utils::path::parent_directory(&file.path);
        while !current.is_empty() {
            if !dirs.insert(current.clone()) {
                break;
            }
            current = crate::utils::path::parent_directory(&current);
        }
    }
    dirs.into_iter().collect()
}
