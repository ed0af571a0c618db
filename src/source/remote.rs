//! Remote git-hosted content source.
//!
//! The actual hosted-git API client (HTTP, authentication, rate limiting) is
//! an external collaborator consumed through [`RemoteRepositoryClient`]:
//! list entries under a path, fetch a file's bytes, fetch a file's commit
//! history. [`RemoteSource`] adapts any such client to the [`ContentSource`]
//! contract, applying exclusion globs during the recursive listing and
//! deriving document timestamps from commit history (first commit = created,
//! latest commit = modified).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::{RepoError, Result};
use crate::pattern::ExclusionSet;
use crate::source::{ContentSource, SourceFile};
use crate::utils::path::normalize_path;

/// One entry of a remote directory listing.
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// One commit touching a file.
#[derive(Debug, Clone)]
pub struct RemoteCommit {
    /// Commit timestamp.
    pub timestamp: DateTime<Utc>,
    /// Commit author, when the backend reports one.
    pub author: Option<String>,
}

/// The consumed remote repository API.
///
/// Implementations live outside this crate (hosted git providers differ);
/// they return `anyhow::Result` so arbitrary transport errors flow through
/// unchanged and get wrapped into provider-scoped errors here.
#[async_trait]
pub trait RemoteRepositoryClient: Send + Sync {
    /// List the entries directly under `path` (`""` for the root).
    async fn list_entries(&self, path: &str) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Fetch a file's raw bytes.
    async fn fetch_file(&self, path: &str) -> anyhow::Result<Vec<u8>>;

    /// Fetch a file's commit history, newest first.
    async fn fetch_history(&self, path: &str) -> anyhow::Result<Vec<RemoteCommit>>;
}

/// Adapts a [`RemoteRepositoryClient`] to the [`ContentSource`] contract.
pub struct RemoteSource {
    name: String,
    client: Arc<dyn RemoteRepositoryClient>,
    root: String,
    exclude: ExclusionSet,
}

impl RemoteSource {
    /// Create a source over `client`, rooted at `root` (`""` for the
    /// repository root).
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Pattern`] when an exclusion glob is malformed.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        client: Arc<dyn RemoteRepositoryClient>,
        root: impl Into<String>,
        exclude: &[S],
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            client,
            root: normalize_path(&root.into()),
            exclude: ExclusionSet::new(exclude)?,
        })
    }

    fn wrap(&self, operation: &'static str, err: anyhow::Error) -> RepoError {
        RepoError::provider(self.name.clone(), operation, err)
    }

    // Repository path for a source-relative path.
    fn full_path(&self, relative: &str) -> String {
        if self.root.is_empty() {
            relative.to_string()
        } else if relative.is_empty() {
            self.root.clone()
        } else {
            format!("{}/{relative}", self.root)
        }
    }

    // Source-relative path for a repository path.
    fn relative_path(&self, full: &str) -> String {
        let normalized = normalize_path(full);
        if self.root.is_empty() {
            return normalized;
        }
        normalized
            .strip_prefix(&format!("{}/", self.root))
            .map(str::to_string)
            .unwrap_or(normalized)
    }

    // Iterative listing over a pending stack; excluded subtrees are pruned
    // before descending.
    async fn walk(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let mut pending = vec![String::new()];
        let mut files = Vec::new();
        let mut directories = Vec::new();

        while let Some(dir) = pending.pop() {
            if cancel.is_cancelled() {
                return Err(RepoError::Cancelled);
            }
            let entries = self
                .client
                .list_entries(&self.full_path(&dir))
                .await
                .map_err(|e| self.wrap("list_entries", e))?;
            for entry in entries {
                let relative = self.relative_path(&entry.path);
                if entry.is_directory {
                    if self.exclude.is_dir_excluded(&relative) {
                        debug!(path = %relative, "pruning excluded remote subtree");
                        continue;
                    }
                    directories.push(relative.clone());
                    pending.push(relative);
                } else if !self.exclude.is_excluded(&relative) {
                    files.push(relative);
                }
            }
        }
        Ok((files, directories))
    }

    async fn timestamps(&self, path: &str) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self.client.fetch_history(&self.full_path(path)).await {
            Ok(commits) if !commits.is_empty() => {
                let modified = commits.first().map(|c| c.timestamp);
                let created = commits.last().map(|c| c.timestamp);
                (created, modified)
            }
            Ok(_) => (None, None),
            Err(err) => {
                debug!(path, error = %err, "commit history unavailable");
                (None, None)
            }
        }
    }
}

#[async_trait]
impl ContentSource for RemoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_files(&self, cancel: &CancellationToken) -> Result<Vec<SourceFile>> {
        let (files, _) = self.walk(cancel).await?;
        let with_timestamps = join_all(files.into_iter().map(|path| async move {
            let (created, modified) = self.timestamps(&path).await;
            SourceFile {
                path,
                created,
                modified,
            }
        }))
        .await;
        if cancel.is_cancelled() {
            return Err(RepoError::Cancelled);
        }
        Ok(with_timestamps)
    }

    async fn list_directories(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let (_, directories) = self.walk(cancel).await?;
        Ok(directories)
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        let bytes = self
            .client
            .fetch_file(&self.full_path(path))
            .await
            .map_err(|e| self.wrap("fetch_file", e))?;
        String::from_utf8(bytes).map_err(|_| RepoError::DocumentParse {
            path: path.to_string(),
            reason: "document is not valid UTF-8".to_string(),
        })
    }

    async fn ensure_root(&self, create: bool) -> Result<()> {
        if create {
            return Err(RepoError::Config {
                reason: format!(
                    "remote source '{}' cannot create its root; create it in the repository",
                    self.name
                ),
            });
        }
        self.client
            .list_entries(&self.root)
            .await
            .map(|_| ())
            .map_err(|e| self.wrap("list_entries", e))
    }
}
