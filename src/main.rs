//! Tally Node
//!
//! Main entry point for running a tally node.

use clap::Parser;
use rand::RngCore;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally_core::consensus::Miner;
use tally_core::constants::DEFAULT_PORT;
use tally_core::ledger::Ledger;
use tally_core::p2p::{ConsensusResolver, HttpChainFetcher, PeerRegistry};
use tally_core::rpc::{start_rpc_server, RpcState};

#[derive(Debug, Parser)]
#[command(name = "tally-node", about = "Run a tally ledger node")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Opaque per-process identity; mining rewards are minted to it.
    let mut id_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut id_bytes);
    let node_id = hex::encode(id_bytes);
    info!(%node_id, "node identity assigned");

    let miner = Miner::new();
    let state = Arc::new(RpcState {
        ledger: Arc::new(Mutex::new(Ledger::new())),
        peers: Arc::new(Mutex::new(PeerRegistry::new())),
        resolver: ConsensusResolver::new(Arc::new(HttpChainFetcher::new())),
        miner: miner.clone(),
        node_id,
    });

    tokio::select! {
        result = start_rpc_server(state, cli.port) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping node");
            miner.stop();
        }
    }

    Ok(())
}
