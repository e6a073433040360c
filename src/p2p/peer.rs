//! Peer registry
//!
//! A membership set of peer network locations, deduplicated by host:port.
//! Populated only by explicit registration; no removal, no health tracking.

use std::collections::HashSet;
use thiserror::Error;

/// Peer registration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeerError {
    #[error("invalid peer address: {0}")]
    InvalidAddress(String),
}

/// Set of known peer locations
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashSet<String>,
}

impl PeerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer by address or URL form
    ///
    /// Extracts the `host:port` location (scheme and path stripped) and
    /// inserts it; registering the same location twice is a no-op. Returns
    /// the normalized location.
    pub fn register(&mut self, address: &str) -> Result<String, PeerError> {
        let location = parse_netloc(address)
            .ok_or_else(|| PeerError::InvalidAddress(address.to_string()))?;
        self.peers.insert(location.clone());
        Ok(location)
    }

    /// Register a batch of peers, all-or-nothing
    ///
    /// Every address is normalized before any is inserted, so a malformed
    /// address rejects the whole batch without mutating the set.
    pub fn register_many(&mut self, addresses: &[String]) -> Result<(), PeerError> {
        let locations = addresses
            .iter()
            .map(|address| {
                parse_netloc(address)
                    .ok_or_else(|| PeerError::InvalidAddress(address.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.peers.extend(locations);
        Ok(())
    }

    /// Known peer locations, no ordering guarantee
    pub fn peers(&self) -> &HashSet<String> {
        &self.peers
    }

    /// Number of known peers
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether no peer is known
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Extract the `host:port` network location from an address or URL form
///
/// Accepts `http://host:port/path`, `host:port`, or a bare host. Returns
/// None when no host component remains.
fn parse_netloc(address: &str) -> Option<String> {
    let without_scheme = match address.find("://") {
        Some(pos) => &address[pos + 3..],
        None => address,
    };
    let netloc = without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .trim();

    if netloc.is_empty() || netloc.starts_with(':') {
        return None;
    }
    Some(netloc.to_string())
}
