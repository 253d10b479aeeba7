//! Content hashing for sync status.
//!
//! The local registry and the remote object are both compared by the
//! SHA-256 of their encoded bytes.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
