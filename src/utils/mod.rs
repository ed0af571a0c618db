//! Shared helpers: path/URL handling and stable id derivation.

pub mod path;

use sha2::{Digest, Sha256};

/// Derive the stable id for an entity from its provider and normalized path.
///
/// Ids are the first 16 hex characters of a SHA-256 over
/// `"{provider_id}:{normalized_path}"`, so the same document always receives
/// the same id across rebuilds and processes. Ids are immutable once a
/// snapshot is published.
#[must_use]
pub fn stable_id(provider_id: &str, path: &str) -> String {
    let normalized = path::normalize_path(path);
    let mut hasher = Sha256::new();
    hasher.update(provider_id.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
