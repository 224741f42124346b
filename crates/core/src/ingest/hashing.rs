//! Content digests for exact-duplicate detection.
//!
//! The digest is the unit of "identical file" detection: a single changed
//! byte (e.g. a timestamp embedded by the exporting tool) yields a different
//! hash and is deliberately NOT treated as a duplicate by this mechanism.
//! Semantically-equal re-exports are caught by the semantic checks instead.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 hex digest of the raw file bytes.
pub fn hash_file_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
