//! Proof-of-work puzzle
//!
//! A block is admitted only once a nonce is found whose substituted digest
//! starts with the difficulty prefix. The search is a linear brute-force
//! from zero; it is CPU-bound and blocks the calling thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::consensus::Block;
use crate::constants::DIFFICULTY_PREFIX;

/// Check whether `proof` satisfies the difficulty predicate for `block`
///
/// Depends only on the single block passed in; used by both the solver
/// and chain validation.
pub fn valid_proof(block: &Block, proof: u64) -> bool {
    block
        .hash_with_proof(proof)
        .as_str()
        .starts_with(DIFFICULTY_PREFIX)
}

/// Find a passing nonce for `block`, mutating its `proof` in place
///
/// Unbounded search; by construction it has no failure mode.
pub fn solve(block: &mut Block) -> u64 {
    block.proof = 0;
    while !valid_proof(block, block.proof) {
        block.proof += 1;
    }
    block.proof
}

/// Mining result
#[derive(Debug)]
pub enum MiningResult {
    /// Found a passing nonce; the block carries it in `proof`
    Success(Block),
    /// The stop signal fired before a nonce was found
    Interrupted,
}

/// Cancellable nonce searcher
///
/// Same search as [`solve`], but checks a shared stop signal each guess so
/// a shutdown can preempt an in-flight search.
#[derive(Clone, Default)]
pub struct Miner {
    stop_signal: Arc<AtomicBool>,
}

impl Miner {
    /// Create a new miner
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a stop signal handle
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Stop mining
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Reset stop signal
    pub fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }

    /// Mine a block (find a valid nonce)
    pub fn mine_block(&self, mut block: Block) -> MiningResult {
        block.proof = 0;
        loop {
            if self.stop_signal.load(Ordering::SeqCst) {
                return MiningResult::Interrupted;
            }
            if valid_proof(&block, block.proof) {
                return MiningResult::Success(block);
            }
            block.proof += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::Transaction;
    use crate::crypto::BlockHash;

    fn candidate() -> Block {
        Block::new(
            2,
            1736339922,
            vec![Transaction::new("alice", "bob", 5)],
            0,
            BlockHash::genesis_marker(),
        )
    }

    #[test]
    fn test_solve_satisfies_predicate() {
        let mut block = candidate();
        let proof = solve(&mut block);

        assert_eq!(block.proof, proof);
        assert!(valid_proof(&block, proof));
        assert!(block.hash().as_str().starts_with(DIFFICULTY_PREFIX));
    }

    #[test]
    fn test_valid_proof_rejects_wrong_nonce() {
        let mut block = candidate();
        let proof = solve(&mut block);

        // The solver stops at the first passing nonce, so the previous
        // guess cannot also pass.
        if proof > 0 {
            assert!(!valid_proof(&block, proof - 1));
        }
    }

    #[test]
    fn test_valid_proof_independent_of_stored_proof() {
        let mut block = candidate();
        let proof = solve(&mut block);

        let mut unsolved = block.clone();
        unsolved.proof = 0;
        assert!(valid_proof(&unsolved, proof));
    }

    #[test]
    fn test_miner_finds_same_nonce_as_solve() {
        let mut block = candidate();
        let proof = solve(&mut block);

        let miner = Miner::new();
        match miner.mine_block(candidate()) {
            MiningResult::Success(mined) => assert_eq!(mined.proof, proof),
            MiningResult::Interrupted => panic!("miner was never stopped"),
        }
    }

    #[test]
    fn test_miner_stop_signal() {
        let miner = Miner::new();
        let signal = miner.stop_signal();

        assert!(!signal.load(Ordering::SeqCst));

        miner.stop();
        assert!(signal.load(Ordering::SeqCst));

        match miner.mine_block(candidate()) {
            MiningResult::Interrupted => {}
            MiningResult::Success(_) => panic!("stopped miner must not mine"),
        }

        miner.reset();
        assert!(!signal.load(Ordering::SeqCst));
    }
}
