//! SHA-256 hashing implementation
//!
//! Block digests are SHA-256, rendered as 64 lowercase hex characters.
//! Two nodes hashing an identical logical block must get identical digests.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::GENESIS_PREVIOUS_HASH;

/// Hex-encoded block digest.
///
/// Also carries the literal genesis marker `"0"`, which is the one
/// `previous_hash` value that is not a digest of any block.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(String);

impl BlockHash {
    /// The `previous_hash` marker of the genesis block
    pub fn genesis_marker() -> Self {
        BlockHash(GENESIS_PREVIOUS_HASH.to_string())
    }

    /// Wrap a 32-byte digest as its hex form
    pub fn from_digest(digest: [u8; 32]) -> Self {
        BlockHash(hex::encode(digest))
    }

    /// Hex string view
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the genesis marker rather than a real digest
    pub fn is_genesis_marker(&self) -> bool {
        self.0 == GENESIS_PREVIOUS_HASH
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.0)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash arbitrary bytes using SHA-256
pub fn hash_bytes(data: &[u8]) -> BlockHash {
    let digest = Sha256::digest(data);
    BlockHash::from_digest(digest.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let data = b"hello world";
        let hash1 = hash_bytes(data);
        let hash2 = hash_bytes(data);
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_inputs() {
        let hash1 = hash_bytes(b"hello");
        let hash2 = hash_bytes(b"world");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_digest_is_64_hex_chars() {
        let hash = hash_bytes(b"test");
        assert_eq!(hash.as_str().len(), 64);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty string
        let hash = hash_bytes(b"");
        assert_eq!(
            hash.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_genesis_marker() {
        let marker = BlockHash::genesis_marker();
        assert!(marker.is_genesis_marker());
        assert_eq!(marker.as_str(), "0");
        assert!(!hash_bytes(b"block").is_genesis_marker());
    }

    #[test]
    fn test_serde_transparent() {
        let hash = hash_bytes(b"wire");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.as_str()));
        let back: BlockHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
