//! Markdown document handling: front-matter extraction and the renderer seam.

pub mod frontmatter;

pub use frontmatter::{ExtractedFrontmatter, FrontmatterParser};

use std::sync::Arc;

/// The markdown-to-HTML renderer seam.
///
/// Rendering is consumed as a pure function (markdown in, HTML out) injected
/// by the embedding application; the repository never pulls in a renderer of
/// its own. When no renderer is provided, items keep `rendered_body: None`.
pub type Renderer = Arc<dyn Fn(&str) -> String + Send + Sync>;
