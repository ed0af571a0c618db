//! Glob pattern matching for content discovery and exclusion.
//!
//! Patterns use standard glob syntax: `*` matches within a path segment,
//! `**` matches any number of segments, `?` matches a single character, and
//! `[a-z]` / `{a,b}` classes are supported by the underlying engine. All
//! matching is case-insensitive and runs against normalized (`/`-separated,
//! source-relative) paths, so the same pattern set behaves identically for
//! filesystem and remote sources.

use glob::{MatchOptions, Pattern};

use crate::core::{RepoError, Result};
use crate::utils::path::normalize_path;

/// A compiled glob pattern for matching normalized content paths.
///
/// Compiled once at construction and reused for every match. Matching never
/// touches the filesystem; sources hand in the relative paths they walked.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Pattern,
    original: String,
}

impl PatternMatcher {
    /// Compile a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Pattern`] if the glob syntax is invalid.
    pub fn new(pattern_str: &str) -> Result<Self> {
        let normalized = normalize_path(pattern_str);
        let pattern = Pattern::new(&normalized).map_err(|source| RepoError::Pattern {
            pattern: pattern_str.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            original: pattern_str.to_string(),
        })
    }

    /// Whether a source-relative path matches this pattern.
    ///
    /// The path is normalized first; comparison is case-insensitive and `*`
    /// does not cross `/` boundaries (use `**` for that).
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_with(&normalize_path(path), options)
    }

    /// The pattern string this matcher was built from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

/// An ordered set of exclusion patterns applied during source walks.
///
/// A path is excluded when any pattern matches it. Directory paths are also
/// tested with a trailing `/**` probe so that excluding `drafts/**` prunes
/// the whole subtree before it is walked.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<PatternMatcher>,
}

impl ExclusionSet {
    /// Compile a list of exclusion patterns.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| PatternMatcher::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether a file path is excluded.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.patterns.iter().any(|p| p.matches(&normalized))
    }

    /// Whether a directory subtree is excluded and can be pruned entirely.
    #[must_use]
    pub fn is_dir_excluded(&self, dir: &str) -> bool {
        let normalized = normalize_path(dir);
        if normalized.is_empty() {
            return false;
        }
        let probe = format!("{normalized}/x");
        self.patterns
            .iter()
            .any(|p| p.matches(&normalized) || p.matches(&probe))
    }

    /// True when no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
