//! Content-derived entity tags.

use sha2::{Digest, Sha256};

/// ## Summary
/// Generates a strong `ETag` from resource bytes: a quoted SHA-256 hex digest.
#[must_use]
pub fn generate_etag(canonical_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes);
    let hash = hasher.finalize();
    format!("\"{}\"", hex::encode(hash))
}

/// ## Summary
/// Generates a collection `CTag` from its members' `(name, etag)` pairs.
///
/// Order-independent; changes when a member is added, removed or modified.
#[must_use]
pub fn generate_ctag<'a>(members: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut members: Vec<_> = members.into_iter().collect();
    members.sort_unstable();

    let mut hasher = Sha256::new();
    for (name, etag) in members {
        hasher.update(name.as_bytes());
        hasher.update([0]);
        hasher.update(etag.as_bytes());
        hasher.update([0]);
    }
    hex::encode(hasher.finalize())
}
