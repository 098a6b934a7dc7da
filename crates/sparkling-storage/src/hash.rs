// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content hashing — SHA-256 fingerprints for cache names and logs.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// First 32 hex characters of the SHA-256 hash.
///
/// Used for deterministic cache file names: the same input always maps to
/// the same name, and 128 bits keeps collisions out of reach while staying
/// readable in a directory listing.
pub fn short_hash(data: &[u8]) -> String {
    let mut hash = hash_bytes(data);
    hash.truncate(32);
    hash
}
