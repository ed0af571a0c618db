//! Error handling for mdrepo
//!
//! The error system distinguishes the three failure classes the repository
//! layer cares about:
//!
//! 1. **Validation errors** (cyclic directory edges, malformed slugs, empty
//!    required fields) are raised synchronously to the caller that attempted
//!    the mutation and are never swallowed.
//! 2. **Provider errors** (I/O failures, malformed remote responses) are
//!    wrapped in [`RepoError::Provider`] carrying the operation name and the
//!    provider id. They surface on a first-time load; on a refresh of an
//!    already-populated cache the cache layer logs them and serves the stale
//!    snapshot instead.
//! 3. **Per-document errors** during a bulk index walk are represented as a
//!    `Result<ContentItem, RepoError>` per file; the walk logs and skips the
//!    offending document so one corrupt file cannot block the whole index.
//!
//! Lower-level components (front-matter parsing, path utilities) never catch:
//! they either succeed or return a typed error. Only the cache managers and
//! the provider orchestrator apply the stale-fallback and skip-and-continue
//! policies.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = RepoError> = std::result::Result<T, E>;

/// The error type for all mdrepo operations.
#[derive(Error, Debug)]
pub enum RepoError {
    /// A directory mutation would introduce a cycle in the tree.
    ///
    /// Raised by `DirectoryTree::add_child` / `set_parent` when the proposed
    /// parent already has the node in its ancestor chain. The tree is left
    /// unchanged.
    #[error("directory '{directory}' cannot be parented under '{ancestor}': the edge would create a cycle")]
    DirectoryCycle {
        /// Path of the directory whose edge was being changed
        directory: String,
        /// Path of the proposed (rejected) ancestor
        ancestor: String,
    },

    /// A required field was empty or a value failed entity validation.
    #[error("validation failed for {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// A slug does not match `^[a-z0-9-]+$`.
    #[error("invalid slug '{slug}': slugs must match ^[a-z0-9-]+$")]
    InvalidSlug {
        /// The rejected slug value
        slug: String,
    },

    /// A single source document could not be parsed into a content item.
    ///
    /// During a bulk index walk this is logged and the document is skipped.
    #[error("failed to parse document '{path}': {reason}")]
    DocumentParse {
        /// Source-relative path of the document
        path: String,
        /// Specific reason for the parse failure
        reason: String,
    },

    /// A provider-scoped operation failed.
    ///
    /// Wraps the underlying cause with the operation name and the id of the
    /// provider it ran under, so callers can report "list_files on provider
    /// 'docs' failed" without losing the source chain.
    #[error("provider '{provider_id}' failed during {operation}")]
    Provider {
        /// Id of the provider the operation ran under
        provider_id: String,
        /// Name of the failed operation (e.g. "list_files", "load_snapshot")
        operation: &'static str,
        /// Underlying cause
        #[source]
        source: anyhow::Error,
    },

    /// The rebuild lock could not be acquired within the configured timeout
    /// and no previous snapshot was available to degrade to.
    #[error("timed out waiting for the {cache} cache rebuild lock")]
    CacheLockTimeout {
        /// Which cache instance timed out ("content" or "directories")
        cache: &'static str,
    },

    /// Repository configuration is missing or inconsistent.
    #[error("configuration error: {reason}")]
    Config {
        /// Description of the configuration problem
        reason: String,
    },

    /// A glob exclusion/inclusion pattern failed to compile.
    #[error("invalid glob pattern '{pattern}'")]
    Pattern {
        /// The offending pattern string
        pattern: String,
        /// Underlying compile error
        #[source]
        source: glob::PatternError,
    },

    /// A file outside the configured content root was requested.
    #[error("path '{path}' escapes the content root")]
    PathOutsideRoot {
        /// The offending path
        path: PathBuf,
    },

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Standard I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepoError {
    /// Wrap an arbitrary error as a provider-scoped failure.
    pub fn provider(
        provider_id: impl Into<String>,
        operation: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Provider {
            provider_id: provider_id.into(),
            operation,
            source: source.into(),
        }
    }

    /// True for errors raised by entity validation (as opposed to I/O or
    /// parsing), which must always propagate to the mutating caller.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DirectoryCycle { .. } | Self::Validation { .. } | Self::InvalidSlug { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_preserves_source() {
        let err = RepoError::provider("docs", "list_files", anyhow::anyhow!("boom"));
        let msg = err.to_string();
        assert!(msg.contains("docs"));
        assert!(msg.contains("list_files"));
        let source = std::error::Error::source(&err).expect("source chain");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn test_is_validation() {
        let cycle = RepoError::DirectoryCycle {
            directory: "a".into(),
            ancestor: "c".into(),
        };
        assert!(cycle.is_validation());
        assert!(!RepoError::Cancelled.is_validation());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RepoError = io.into();
        assert!(matches!(err, RepoError::Io(_)));
    }
}
