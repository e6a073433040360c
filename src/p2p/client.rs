//! Chain fetch transport
//!
//! HTTP client for pulling a remote node's ledger snapshot. The transport
//! sits behind a trait so consensus resolution can run against an
//! in-memory fake in tests.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::consensus::Block;

/// Default timeout for a chain fetch.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Snapshot of a remote node's ledger.
///
/// The API contract: `GET http://{peer}/chain` returns
/// `{"chain": [Block...], "length": int}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteChain {
    pub chain: Vec<Block>,
    pub length: u64,
}

/// Transport errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The peer did not answer within the timeout or refused the connection
    #[error("peer unreachable: {0}")]
    Unreachable(String),
    /// The peer answered with something other than a chain snapshot
    #[error("bad response from peer: {0}")]
    BadResponse(String),
}

/// Fetch a peer's reported chain length and chain contents, or report
/// the peer unreachable.
#[async_trait]
pub trait ChainFetcher: Send + Sync {
    async fn fetch_chain(&self, peer: &str) -> Result<RemoteChain, FetchError>;
}

/// HTTP implementation of [`ChainFetcher`]
pub struct HttpChainFetcher {
    /// HTTP client (reusable connection pool)
    http_client: reqwest::Client,
}

impl HttpChainFetcher {
    /// Create a fetcher with default timeout settings
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http_client }
    }
}

impl Default for HttpChainFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &str) -> Result<RemoteChain, FetchError> {
        let url = format!("http://{}/chain", peer.trim_end_matches('/'));

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                FetchError::Unreachable(format!("connection failed: {e}"))
            } else {
                FetchError::BadResponse(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::BadResponse(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        response
            .json::<RemoteChain>()
            .await
            .map_err(|e| FetchError::BadResponse(format!("failed to parse chain snapshot: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_peer_maps_to_unreachable() {
        // Nothing listens on a reserved TEST-NET address.
        let fetcher = HttpChainFetcher::with_timeout(Duration::from_millis(300));
        let result = fetcher.fetch_chain("192.0.2.1:5000").await;

        assert!(matches!(result, Err(FetchError::Unreachable(_))));
    }

    #[test]
    fn test_remote_chain_decodes_wire_form() {
        let body = r#"{
            "chain": [{
                "index": 1,
                "timestamp": 1736339922,
                "transactions": [],
                "proof": 0,
                "previous_hash": "0"
            }],
            "length": 1
        }"#;

        let snapshot: RemoteChain = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot.length, 1);
        assert_eq!(snapshot.chain.len(), 1);
        assert!(snapshot.chain[0].is_genesis());
    }
}
