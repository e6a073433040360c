//! Chain validation
//!
//! Pure functions for validating an entire candidate chain. The whole
//! candidate is valid or invalid; there is no partial acceptance.

use thiserror::Error;

use crate::consensus::{valid_proof, Block};

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("previous hash mismatch at block {0}")]
    PrevHashMismatch(u64),
    #[error("invalid proof of work at block {0}")]
    InvalidProof(u64),
}

/// Validate a candidate chain
///
/// Walks adjacent pairs forward: each block must link to the digest of its
/// predecessor, and each block's recorded proof must satisfy the difficulty
/// predicate against that block's own hash context. Empty and genesis-only
/// candidates are trivially valid.
pub fn validate_chain(chain: &[Block]) -> Result<(), ValidationError> {
    for pair in chain.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);

        if current.previous_hash != previous.hash() {
            return Err(ValidationError::PrevHashMismatch(current.index));
        }

        if !valid_proof(current, current.proof) {
            return Err(ValidationError::InvalidProof(current.index));
        }
    }

    Ok(())
}

/// Boolean form of [`validate_chain`]
pub fn is_valid_chain(chain: &[Block]) -> bool {
    validate_chain(chain).is_ok()
}
