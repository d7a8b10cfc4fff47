// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Content hashing for stable identifiers
//!
//! Uses BLAKE3 for node ids and snapshot fingerprints.

use blake3::Hasher;

/// Number of hex characters kept for a node id
const NODE_ID_LEN: usize = 8;

/// Stable node id for a fully-qualified node name.
///
/// Pure function of the name, so the same node keeps its id across runs
/// and across pipelines.
pub fn node_id(full_name: &str) -> String {
    let mut hex = hash_string(full_name);
    hex.truncate(NODE_ID_LEN);
    hex
}

/// Incremental hasher used to fingerprint snapshot contents
pub struct ContentHasher {
    hasher: Hasher,
}

impl ContentHasher {
    /// Create a new content hasher
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    /// Hash arbitrary bytes
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finalize and get the hash
    pub fn finalize(self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute a full-length hash of a string
pub fn hash_string(s: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(s.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint raw snapshot bytes
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = ContentHasher::new();
    hasher.update(content);
    hasher.finalize()
}
