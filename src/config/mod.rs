//! Repository configuration.
//!
//! Configuration is plain TOML deserialized into [`RepositoryConfig`]; every
//! field has a default so an empty file (or `Default::default()`) yields a
//! working single-locale repository. The content root supports `~` expansion.
//!
//! ```toml
//! provider_id = "docs"
//! root = "~/content"
//! default_locale = "en"
//! locales = ["en", "fr"]
//! index_file = "_index.md"
//! exclude = ["**/drafts/**", "**/.git/**"]
//! cache_ttl_secs = 300
//! lock_timeout_secs = 10
//! create_root = true
//! watch = false
//! debounce_ms = 300
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{RepoError, Result};
use crate::pattern::ExclusionSet;

/// Configuration for one content provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Identifier of the provider; items carry it and the registry keys on
    /// it. Generated when left empty.
    pub provider_id: String,
    /// Content root directory (filesystem sources). `~` is expanded.
    pub root: String,
    /// Locale assigned when no locale segment is present.
    pub default_locale: String,
    /// Locale segments recognized at the top of source paths.
    pub locales: Vec<String>,
    /// Name of the per-directory metadata document.
    pub index_file: String,
    /// Glob patterns excluded from indexing.
    pub exclude: Vec<String>,
    /// Snapshot lifetime in seconds.
    pub cache_ttl_secs: u64,
    /// Bound on rebuild-lock acquisition in seconds.
    pub lock_timeout_secs: u64,
    /// Create the content root during initialization when missing.
    pub create_root: bool,
    /// Start a filesystem change watcher during initialization.
    pub watch: bool,
    /// Watcher debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            provider_id: format!("provider-{}", uuid::Uuid::new_v4()),
            root: String::from("content"),
            default_locale: String::from("en"),
            locales: Vec::new(),
            index_file: String::from("_index.md"),
            exclude: Vec::new(),
            cache_ttl_secs: 300,
            lock_timeout_secs: 10,
            create_root: false,
            watch: false,
            debounce_ms: 300,
        }
    }
}

impl RepositoryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Io`] when the file cannot be read and
    /// [`RepoError::Config`] when it is not valid TOML or fails validation.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&text).map_err(|e| RepoError::Config {
            reason: format!("invalid config file '{}': {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field consistency and compile the exclusion patterns once.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Config`] for empty required fields and
    /// [`RepoError::Pattern`] for malformed globs.
    pub fn validate(&self) -> Result<()> {
        if self.provider_id.trim().is_empty() {
            return Err(RepoError::Config {
                reason: "provider_id must not be empty".to_string(),
            });
        }
        if self.default_locale.trim().is_empty() {
            return Err(RepoError::Config {
                reason: "default_locale must not be empty".to_string(),
            });
        }
        if self.index_file.trim().is_empty() {
            return Err(RepoError::Config {
                reason: "index_file must not be empty".to_string(),
            });
        }
        ExclusionSet::new(&self.exclude)?;
        Ok(())
    }

    /// The content root with `~` expanded.
    #[must_use]
    pub fn expanded_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.root).into_owned())
    }

    /// Snapshot lifetime.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Rebuild-lock acquisition bound.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    /// Watcher debounce window.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
