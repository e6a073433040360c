//! Ledger state management
//!
//! Owns exactly one chain and one pending-transaction queue. The chain is
//! never mutated except by appending one block at a time or by wholesale
//! replacement during consensus; the queue drains into a block at
//! block-creation time.

use thiserror::Error;
use tracing::info;

use crate::consensus::{current_timestamp, solve, Block, Transaction};
use crate::crypto::BlockHash;

/// Ledger errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The chain moved while a candidate was being solved
    #[error("candidate no longer extends the chain tip")]
    StaleCandidate,
}

/// The chain plus the not-yet-committed transaction queue
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a ledger with its genesis block
    ///
    /// Genesis carries index 1, proof 0, the marker previous hash, and no
    /// transactions; no proof-of-work is performed for it.
    pub fn new() -> Self {
        let genesis = Block::new(
            1,
            current_timestamp(),
            vec![],
            0,
            BlockHash::genesis_marker(),
        );
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
        }
    }

    /// Queue a transaction for inclusion in the next mined block
    ///
    /// Never touches the chain. Returns the index of the block that will
    /// contain the transaction.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> u64 {
        self.pending.push(Transaction::new(sender, recipient, amount));
        self.chain_length() + 1
    }

    /// Transactions queued for the next block, in admission order
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    /// Snapshot a mining candidate and take ownership of the queue
    ///
    /// The candidate captures everything queued so far; transactions
    /// admitted while its nonce is being searched land in the next block.
    /// The candidate's proof is unsolved (0) until [`solve`] or a miner
    /// runs on it.
    pub fn begin_block(&mut self) -> Block {
        Block::new(
            self.chain_length() + 1,
            current_timestamp(),
            std::mem::take(&mut self.pending),
            0,
            self.last_block().hash(),
        )
    }

    /// Append a solved candidate to the chain
    ///
    /// Rejects a candidate whose `previous_hash` no longer matches the tip,
    /// which happens when consensus replaced the chain mid-search.
    pub fn commit_block(&mut self, block: Block) -> Result<&Block, LedgerError> {
        if block.previous_hash != self.last_block().hash() {
            return Err(LedgerError::StaleCandidate);
        }
        info!(index = block.index, txs = block.transactions.len(), "block appended");
        self.chain.push(block);
        Ok(self.last_block())
    }

    /// Mine and append a new block, returning it
    ///
    /// Snapshots the queue, solves the proof-of-work inline (blocking the
    /// caller for the full search), and appends. Callers that must not hold
    /// a lock across the search use [`Ledger::begin_block`] and
    /// [`Ledger::commit_block`] instead.
    pub fn new_block(&mut self) -> Block {
        let mut block = self.begin_block();
        solve(&mut block);
        info!(index = block.index, proof = block.proof, "block mined");
        self.chain.push(block);
        self.last_block().clone()
    }

    /// The most recently appended block; the chain is never empty
    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain holds at least genesis")
    }

    /// Read-only copy of the chain for external serving
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.chain.clone()
    }

    /// Number of blocks in the chain
    pub fn chain_length(&self) -> u64 {
        self.chain.len() as u64
    }

    /// Replace the chain wholesale with a longer valid one
    ///
    /// Only consensus resolution calls this; the pending queue is untouched.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        info!(
            old_length = self.chain.len(),
            new_length = chain.len(),
            "chain replaced"
        );
        self.chain = chain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{is_valid_chain, valid_proof};

    #[test]
    fn test_fresh_ledger() {
        let ledger = Ledger::new();

        assert_eq!(ledger.chain_length(), 1);
        assert_eq!(ledger.last_block().index, 1);
        assert_eq!(ledger.last_block().proof, 0);
        assert_eq!(ledger.last_block().previous_hash.as_str(), "0");
        assert!(ledger.pending_transactions().is_empty());
    }

    #[test]
    fn test_new_transaction_queues_without_mutating_chain() {
        let mut ledger = Ledger::new();

        let index = ledger.new_transaction("alice", "bob", 10);

        assert_eq!(index, ledger.chain_length() + 1);
        assert_eq!(ledger.chain_length(), 1);
        assert_eq!(ledger.pending_transactions().len(), 1);
    }

    #[test]
    fn test_new_block_captures_and_clears_queue() {
        let mut ledger = Ledger::new();
        ledger.new_transaction("alice", "bob", 10);

        let block = ledger.new_block();

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions, vec![Transaction::new("alice", "bob", 10)]);
        assert!(ledger.pending_transactions().is_empty());
        assert!(valid_proof(&block, block.proof));

        // An immediate second block carries no transactions.
        let empty = ledger.new_block();
        assert_eq!(empty.index, 3);
        assert!(empty.transactions.is_empty());
    }

    #[test]
    fn test_mined_blocks_link_and_validate() {
        let mut ledger = Ledger::new();
        ledger.new_transaction("alice", "bob", 1);
        ledger.new_block();
        ledger.new_transaction("bob", "carol", 2);
        ledger.new_block();

        let chain = ledger.chain_snapshot();
        assert_eq!(chain.len(), 3);
        assert!(is_valid_chain(&chain));
        assert_eq!(chain[2].previous_hash, chain[1].hash());
    }

    #[test]
    fn test_transactions_admitted_mid_search_go_to_next_block() {
        let mut ledger = Ledger::new();
        ledger.new_transaction("alice", "bob", 10);

        let mut candidate = ledger.begin_block();
        assert_eq!(candidate.transactions.len(), 1);

        // Queued after the snapshot: belongs to the following block.
        ledger.new_transaction("carol", "dave", 5);

        solve(&mut candidate);
        let committed = ledger.commit_block(candidate).unwrap();
        assert_eq!(committed.transactions.len(), 1);
        assert_eq!(ledger.pending_transactions().len(), 1);
    }

    #[test]
    fn test_commit_rejects_stale_candidate() {
        let mut ledger = Ledger::new();
        let mut candidate = ledger.begin_block();
        solve(&mut candidate);

        // The chain moves while the candidate was being solved.
        ledger.new_block();

        assert_eq!(
            ledger.commit_block(candidate),
            Err(LedgerError::StaleCandidate)
        );
        assert_eq!(ledger.chain_length(), 2);
    }

    #[test]
    fn test_replace_chain_keeps_pending_queue() {
        let mut donor = Ledger::new();
        donor.new_block();
        donor.new_block();

        let mut ledger = Ledger::new();
        ledger.new_transaction("alice", "bob", 10);
        ledger.replace_chain(donor.chain_snapshot());

        assert_eq!(ledger.chain_length(), 3);
        assert_eq!(ledger.pending_transactions().len(), 1);
    }
}
