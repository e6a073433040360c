//! Block and transaction structures
//!
//! Defines the immutable transaction and block value types and the
//! canonical byte serialization their digests are computed over.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::MINT_SENDER;
use crate::crypto::{hash_bytes, BlockHash};

/// A single ledger entry
///
/// Opaque payload to the ledger: no identifier format or balance rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender identifier; the literal `"0"` marks a system-minted reward
    pub sender: String,
    /// Recipient identifier
    pub recipient: String,
    /// Transferred amount
    pub amount: u64,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Whether this is a system-minted reward
    pub fn is_mint(&self) -> bool {
        self.sender == MINT_SENDER
    }
}

/// One unit of the ledger, immutable once hashed and appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain, contiguous
    pub index: u64,
    /// Creation time, seconds since the Unix epoch
    pub timestamp: u64,
    /// Transactions in admission order
    pub transactions: Vec<Transaction>,
    /// Nonce satisfying the difficulty predicate; 0 for genesis
    pub proof: u64,
    /// Digest of the preceding block; the genesis marker for the first block
    pub previous_hash: BlockHash,
}

impl Block {
    /// Create a new block
    pub fn new(
        index: u64,
        timestamp: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: BlockHash,
    ) -> Self {
        Self {
            index,
            timestamp,
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Serialize the block for hashing, with `proof` substituted
    ///
    /// Field order is fixed: index, timestamp, transactions, proof,
    /// previous_hash. Strings are length-prefixed so field boundaries
    /// stay unambiguous.
    fn to_bytes_with_proof(&self, proof: u64) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&(self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            push_str(&mut bytes, &tx.sender);
            push_str(&mut bytes, &tx.recipient);
            bytes.extend_from_slice(&tx.amount.to_le_bytes());
        }
        bytes.extend_from_slice(&proof.to_le_bytes());
        push_str(&mut bytes, self.previous_hash.as_str());
        bytes
    }

    /// Calculate the digest of this block
    pub fn hash(&self) -> BlockHash {
        self.hash_with_proof(self.proof)
    }

    /// Calculate the digest this block would have with `proof` substituted
    pub fn hash_with_proof(&self, proof: u64) -> BlockHash {
        hash_bytes(&self.to_bytes_with_proof(proof))
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_genesis_marker()
    }
}

fn push_str(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u64).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

/// Current time in seconds since the Unix epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
