//! Front-matter extraction built on a raw `gray_matter` engine.
//!
//! A document is `---\n<frontmatter>\n---\n<body>`: a leading block bounded
//! by the fixed `---` delimiter line and the next occurrence of the same
//! delimiter. The custom engine returns the raw block text without parsing,
//! so malformed YAML can be reported as a typed per-document error instead of
//! being silently dropped, and stripping the block never depends on the YAML
//! being well-formed.

use gray_matter::{
    Matter, Pod,
    engine::Engine,
};
use serde_yaml::Mapping;

use crate::core::{RepoError, Result};

/// gray_matter engine that returns the raw front-matter text unparsed.
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> std::result::Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// Result of splitting a document into front matter and body.
#[derive(Debug, Clone)]
pub struct ExtractedFrontmatter {
    /// Parsed key/value fields, when a front-matter block was present.
    pub fields: Option<Mapping>,
    /// The raw block text (without delimiters), when present.
    pub raw: Option<String>,
    /// Document body with the front-matter block removed.
    pub body: String,
}

impl ExtractedFrontmatter {
    /// Whether the document carried a front-matter block.
    #[must_use]
    pub fn has_frontmatter(&self) -> bool {
        self.raw.is_some()
    }
}

/// Splits documents into front-matter fields and body.
pub struct FrontmatterParser {
    raw_matter: Matter<RawFrontmatter>,
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrontmatterParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontmatterParser").finish()
    }
}

impl FrontmatterParser {
    /// Create a parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw_matter: Matter::new(),
        }
    }

    /// Extract front matter and body from a document.
    ///
    /// `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::DocumentParse`] when a front-matter block is
    /// present but is not valid YAML key/value mapping syntax. Documents
    /// without a block succeed with `fields: None` and the content unchanged
    /// as the body.
    pub fn extract(&self, content: &str, path: &str) -> Result<ExtractedFrontmatter> {
        let parsed = self
            .raw_matter
            .parse::<String>(content)
            .map_err(|e| RepoError::DocumentParse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        let raw = parsed.data.filter(|block| !block.trim().is_empty());
        let fields = match raw.as_deref() {
            Some(block) => Some(serde_yaml::from_str::<Mapping>(block).map_err(|e| {
                RepoError::DocumentParse {
                    path: path.to_string(),
                    reason: format!("invalid front matter: {e}"),
                }
            })?),
            None => None,
        };

        Ok(ExtractedFrontmatter {
            fields,
            raw,
            body: parsed.content,
        })
    }

    /// Whether a document starts with a front-matter block.
    #[must_use]
    pub fn has_frontmatter(&self, content: &str) -> bool {
        self.raw_matter
            .parse::<String>(content)
            .map(|parsed| parsed.data.is_some())
            .unwrap_or(false)
    }

    /// Remove the front-matter block, keeping only the body.
    ///
    /// Works even when the block is not valid YAML.
    #[must_use]
    pub fn strip(&self, content: &str) -> String {
        self.raw_matter
            .parse::<String>(content)
            .map(|parsed| parsed.content)
            .unwrap_or_else(|_| content.to_string())
    }
}
