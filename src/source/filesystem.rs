//! Local filesystem content source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;
use tracing::trace;
use walkdir::WalkDir;

use crate::core::{RepoError, Result};
use crate::pattern::ExclusionSet;
use crate::source::{ContentSource, SourceFile};
use crate::utils::path::normalize_path;

/// A content source rooted at a local directory.
///
/// Listing walks the tree with `walkdir` on a blocking thread, pruning
/// excluded subtrees before descending into them. File timestamps come from
/// filesystem metadata; platforms without a creation time fall back to the
/// modification time.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    name: String,
    root: PathBuf,
    exclude: ExclusionSet,
}

impl FileSystemSource {
    /// Create a source over `root` with the given exclusion globs.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Pattern`] when an exclusion glob is malformed.
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, exclude: &[S]) -> Result<Self> {
        let root = root.into();
        Ok(Self {
            name: format!("fs:{}", root.display()),
            root,
            exclude: ExclusionSet::new(exclude)?,
        })
    }

    /// The configured root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    // Resolve a source-relative path against the root, rejecting traversal.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = PathBuf::from(normalize_path(path));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(RepoError::PathOutsideRoot { path: relative });
        }
        Ok(self.root.join(relative))
    }

    fn walk(
        root: PathBuf,
        exclude: ExclusionSet,
        cancel: CancellationToken,
        want_dirs: bool,
    ) -> Result<Vec<SourceFile>> {
        let mut out = Vec::new();
        let mut iter = WalkDir::new(&root).follow_links(false).into_iter();
        loop {
            if cancel.is_cancelled() {
                return Err(RepoError::Cancelled);
            }
            let entry = match iter.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(err)) => return Err(std::io::Error::from(err).into()),
            };
            let relative = entry
                .path()
                .strip_prefix(&root)
                .map(|p| normalize_path(&p.to_string_lossy()))
                .unwrap_or_default();
            if relative.is_empty() {
                continue; // the root itself
            }
            if entry.file_type().is_dir() {
                if exclude.is_dir_excluded(&relative) {
                    trace!(path = %relative, "pruning excluded subtree");
                    iter.skip_current_dir();
                    continue;
                }
                if want_dirs {
                    out.push(SourceFile {
                        path: relative,
                        created: None,
                        modified: None,
                    });
                }
            } else if entry.file_type().is_file() && !want_dirs {
                if exclude.is_excluded(&relative) {
                    continue;
                }
                let metadata = entry.metadata().map_err(std::io::Error::from)?;
                let modified = metadata.modified().ok().map(to_utc);
                let created = metadata.created().ok().map(to_utc).or(modified);
                out.push(SourceFile {
                    path: relative,
                    created,
                    modified,
                });
            }
        }
        Ok(out)
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

#[async_trait]
impl ContentSource for FileSystemSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_files(&self, cancel: &CancellationToken) -> Result<Vec<SourceFile>> {
        let root = self.root.clone();
        let exclude = self.exclude.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || Self::walk(root, exclude, cancel, false))
            .await
            .map_err(|e| RepoError::Io(std::io::Error::other(e)))?
    }

    async fn list_directories(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let root = self.root.clone();
        let exclude = self.exclude.clone();
        let cancel = cancel.clone();
        let entries =
            tokio::task::spawn_blocking(move || Self::walk(root, exclude, cancel, true))
                .await
                .map_err(|e| RepoError::Io(std::io::Error::other(e)))??;
        Ok(entries.into_iter().map(|e| e.path).collect())
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::read_to_string(full).await?)
    }

    async fn ensure_root(&self, create: bool) -> Result<()> {
        if tokio::fs::try_exists(&self.root).await? {
            return Ok(());
        }
        if create {
            tokio::fs::create_dir_all(&self.root).await?;
            return Ok(());
        }
        Err(RepoError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("content root '{}' does not exist", self.root.display()),
        )))
    }
}
