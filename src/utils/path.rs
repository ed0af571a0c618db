//! Path normalization, locale segments, and URL derivation.
//!
//! All paths handled by the repository are source-relative and normalized to
//! `/` separators before anything else looks at them. URLs are derived from
//! normalized paths: the file extension is dropped, the configured index
//! document maps to its directory's URL, and segments are lowercased with
//! whitespace collapsed to hyphens so they are stable and link-safe.

use regex::Regex;
use std::sync::OnceLock;

/// Normalize a source-relative path to `/` separators.
///
/// Backslashes become forward slashes, repeated separators collapse, and
/// leading `./` / leading and trailing `/` are stripped. The result is the
/// canonical form used for ids, URLs, and case-insensitive comparisons.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_sep = true; // swallows leading separators
    for ch in path.chars() {
        let ch = if ch == '\\' { '/' } else { ch };
        if ch == '/' {
            if !last_was_sep {
                out.push('/');
            }
            last_was_sep = true;
        } else {
            out.push(ch);
            last_was_sep = false;
        }
    }
    if out.ends_with('/') {
        out.pop();
    }
    if let Some(rest) = out.strip_prefix("./") {
        return rest.to_string();
    }
    out
}

/// Split the leading locale segment off a normalized path.
///
/// If the first path segment matches one of `locales` (case-insensitive),
/// returns that locale (in its configured casing) and the remainder of the
/// path. Otherwise returns `default_locale` and the path untouched.
#[must_use]
pub fn split_locale<'a>(
    path: &str,
    locales: &'a [String],
    default_locale: &'a str,
) -> (&'a str, String) {
    let normalized = normalize_path(path);
    let (first, rest) = match normalized.split_once('/') {
        Some((first, rest)) => (first, rest.to_string()),
        None => (normalized.as_str(), String::new()),
    };
    for locale in locales {
        if locale.eq_ignore_ascii_case(first) {
            return (locale.as_str(), rest);
        }
    }
    (default_locale, normalized)
}

/// Derive the canonical URL for a content document path.
///
/// `blog/Post One.md` becomes `/blog/post-one`; the configured index document
/// maps to its directory URL (`blog/_index.md` → `/blog`). The root index
/// maps to `/`.
#[must_use]
pub fn url_from_path(path: &str, index_file: &str) -> String {
    let normalized = normalize_path(path);
    let (dir, file) = match normalized.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", normalized.as_str()),
    };

    if file.eq_ignore_ascii_case(index_file) {
        return directory_url(dir);
    }

    let stem = strip_markdown_extension(file);
    let mut url = directory_url(dir);
    if url != "/" {
        url.push('/');
    }
    url.push_str(&url_segment(stem));
    url
}

/// Canonical URL of a directory path (`""` maps to `/`).
#[must_use]
pub fn directory_url(path: &str) -> String {
    let normalized = normalize_path(path);
    if normalized.is_empty() {
        return "/".to_string();
    }
    let mut url = String::from("/");
    let mut first = true;
    for segment in normalized.split('/') {
        if !first {
            url.push('/');
        }
        url.push_str(&url_segment(segment));
        first = false;
    }
    url
}

/// Parent directory of a normalized path (`""` for root-level entries).
#[must_use]
pub fn parent_directory(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

/// Final segment of a normalized path.
#[must_use]
pub fn file_name(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => normalized,
    }
}

/// Whether a path points at a markdown document.
#[must_use]
pub fn is_markdown(path: &str) -> bool {
    let name = file_name(path);
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

/// Strip a trailing `.md` / `.markdown` extension, if present.
#[must_use]
pub fn strip_markdown_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".markdown") {
        &name[..name.len() - ".markdown".len()]
    } else if lower.ends_with(".md") {
        &name[..name.len() - ".md".len()]
    } else {
        name
    }
}

/// Turn arbitrary text into a URL-safe slug.
///
/// Lowercases, strips everything outside `[a-z0-9\s-]`, collapses whitespace
/// runs to single hyphens, collapses repeated hyphens, and trims hyphens from
/// both ends. An empty result falls back to `"untitled"`.
#[must_use]
pub fn slugify(text: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static HYPHENS: OnceLock<Regex> = OnceLock::new();

    let invalid = INVALID.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("static regex"));
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    let hyphens = HYPHENS.get_or_init(|| Regex::new(r"-{2,}").expect("static regex"));

    let lowered = text.to_lowercase();
    let cleaned = invalid.replace_all(&lowered, "");
    let hyphenated = whitespace.replace_all(cleaned.trim(), "-");
    let collapsed = hyphens.replace_all(&hyphenated, "-");
    let slug = collapsed.trim_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Whether a string already is a valid slug (`^[a-z0-9-]+$`).
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn url_segment(segment: &str) -> String {
    slugify_segment(segment)
}

// URL segments keep the slug rules but must never be empty; a segment that
// slugifies to nothing keeps a single hyphen so the path depth is preserved.
fn slugify_segment(segment: &str) -> String {
    let slug = slugify(segment);
    if slug == "untitled" && !segment.eq_ignore_ascii_case("untitled") {
        "-".to_string()
    } else {
        slug
    }
}
