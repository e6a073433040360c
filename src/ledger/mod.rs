//! Ledger module - the chain and the pending-transaction pool

mod state;

pub use state::*;
