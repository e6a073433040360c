//! Consensus resolution
//!
//! Longest-valid-chain rule: poll every registered peer, keep the longest
//! candidate that is strictly longer than the local chain and validates,
//! and swap it in atomically. Unreachable peers are skipped, never fatal.

use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::consensus::validate_chain;
use crate::ledger::Ledger;
use crate::p2p::{ChainFetcher, PeerRegistry};

/// Peer conflict resolver
pub struct ConsensusResolver {
    fetcher: Arc<dyn ChainFetcher>,
}

impl ConsensusResolver {
    /// Create a resolver over the given transport
    pub fn new(fetcher: Arc<dyn ChainFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve conflicts against all known peers
    ///
    /// Peers are polled concurrently; candidates are compared in sorted
    /// peer-address order so the winner is deterministic regardless of
    /// response arrival order. Returns whether the local chain was replaced.
    pub async fn resolve(&self, ledger: &Mutex<Ledger>, registry: &Mutex<PeerRegistry>) -> bool {
        let local_length = ledger.lock().unwrap().chain_length();
        let mut peers: Vec<String> = registry.lock().unwrap().peers().iter().cloned().collect();
        peers.sort();

        let mut handles = Vec::with_capacity(peers.len());
        for peer in peers {
            let fetcher = Arc::clone(&self.fetcher);
            handles.push(tokio::spawn(async move {
                let result = fetcher.fetch_chain(&peer).await;
                (peer, result)
            }));
        }

        let mut responses = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(response) = handle.await {
                responses.push(response);
            }
        }
        responses.sort_by(|a, b| a.0.cmp(&b.0));

        let mut best: Option<Vec<_>> = None;
        let mut max_length = local_length;

        for (peer, result) in responses {
            let snapshot = match result {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(peer = %peer, error = %e, "skipping peer");
                    continue;
                }
            };

            if snapshot.length != snapshot.chain.len() as u64 {
                warn!(peer = %peer, "reported length disagrees with chain, rejecting");
                continue;
            }

            // Strictly greater only: equal-length candidates never replace
            // the local chain, and among longer ones the first in sorted
            // peer order wins ties.
            if snapshot.length <= max_length {
                continue;
            }

            match validate_chain(&snapshot.chain) {
                Ok(()) => {
                    info!(peer = %peer, length = snapshot.length, "longer valid chain found");
                    max_length = snapshot.length;
                    best = Some(snapshot.chain);
                }
                Err(e) => {
                    warn!(peer = %peer, error = %e, "rejecting invalid candidate chain");
                }
            }
        }

        if let Some(chain) = best {
            let mut guard = ledger.lock().unwrap();
            // The local chain may have grown mid-resolution; never shrink it.
            if chain.len() as u64 > guard.chain_length() {
                guard.replace_chain(chain);
                return true;
            }
        }
        false
    }
}
