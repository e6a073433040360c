//! HTTP Method Implementations
//!
//! Each handler corresponds to one route external callers can hit.
//! Request bodies deserialize with `Option` fields so a missing field maps
//! to 400 with a message, not a bare deserialization rejection.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::consensus::{Block, Miner, MiningResult, Transaction};
use crate::constants::{MINING_REWARD, MINT_SENDER};
use crate::crypto::BlockHash;
use crate::ledger::{Ledger, LedgerError};
use crate::p2p::{ConsensusResolver, PeerRegistry};

/// Handler state
pub struct RpcState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub peers: Arc<Mutex<PeerRegistry>>,
    pub resolver: ConsensusResolver,
    pub miner: Miner,
    /// Opaque identity assigned once per process start; mining rewards
    /// are minted to it
    pub node_id: String,
}

/// Plain message body for errors and acknowledgements
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// GET /chain response
#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: u64,
}

/// GET /chain - full ledger snapshot
pub async fn full_chain(State(state): State<Arc<RpcState>>) -> Json<ChainResponse> {
    let ledger = state.ledger.lock().unwrap();
    Json(ChainResponse {
        chain: ledger.chain_snapshot(),
        length: ledger.chain_length(),
    })
}

/// POST /transactions/new request body
#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<u64>,
}

/// POST /transactions/new - queue a transaction
pub async fn new_transaction(
    State(state): State<Arc<RpcState>>,
    Json(body): Json<NewTransactionRequest>,
) -> (StatusCode, Json<MessageResponse>) {
    let (sender, recipient, amount) = match (body.sender, body.recipient, body.amount) {
        (Some(sender), Some(recipient), Some(amount)) => (sender, recipient, amount),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                MessageResponse::new("Missing values: sender, recipient and amount are required"),
            );
        }
    };

    let index = state
        .ledger
        .lock()
        .unwrap()
        .new_transaction(sender, recipient, amount);
    info!(block_index = index, "transaction queued");

    (
        StatusCode::CREATED,
        MessageResponse::new(format!("Transaction will be added to block {index}")),
    )
}

/// GET /mine response
#[derive(Debug, Serialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: BlockHash,
}

/// GET /mine - mint a reward, solve the puzzle, append a block
///
/// The pending queue and tip are snapshotted under the ledger lock, the
/// nonce search runs on a blocking thread without it, and the lock is
/// re-acquired only to append.
pub async fn mine(
    State(state): State<Arc<RpcState>>,
) -> Result<Json<MineResponse>, (StatusCode, Json<MessageResponse>)> {
    let candidate = {
        let mut ledger = state.ledger.lock().unwrap();
        ledger.new_transaction(MINT_SENDER, state.node_id.clone(), MINING_REWARD);
        ledger.begin_block()
    };

    let miner = state.miner.clone();
    let result = tokio::task::spawn_blocking(move || miner.mine_block(candidate))
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                MessageResponse::new("Mining task failed"),
            )
        })?;

    let solved = match result {
        MiningResult::Success(block) => block,
        MiningResult::Interrupted => {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                MessageResponse::new("Mining interrupted by shutdown"),
            ));
        }
    };

    let mut ledger = state.ledger.lock().unwrap();
    match ledger.commit_block(solved) {
        Ok(block) => Ok(Json(MineResponse {
            message: "New block forged".to_string(),
            index: block.index,
            transactions: block.transactions.clone(),
            proof: block.proof,
            previous_hash: block.previous_hash.clone(),
        })),
        Err(LedgerError::StaleCandidate) => Err((
            StatusCode::CONFLICT,
            MessageResponse::new("Chain was replaced while mining, block discarded"),
        )),
    }
}

/// POST /nodes/register request body
#[derive(Debug, Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

/// POST /nodes/register response
#[derive(Debug, Serialize)]
pub struct RegisterNodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

/// POST /nodes/register - add peers to the registry
pub async fn register_nodes(
    State(state): State<Arc<RpcState>>,
    Json(body): Json<RegisterNodesRequest>,
) -> Result<(StatusCode, Json<RegisterNodesResponse>), (StatusCode, Json<MessageResponse>)> {
    let nodes = body.nodes.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            MessageResponse::new("Error: please supply a list of nodes"),
        )
    })?;

    let mut peers = state.peers.lock().unwrap();
    peers
        .register_many(&nodes)
        .map_err(|e| (StatusCode::BAD_REQUEST, MessageResponse::new(e.to_string())))?;
    info!(total = peers.len(), "peers registered");

    let mut total_nodes: Vec<String> = peers.peers().iter().cloned().collect();
    total_nodes.sort();

    Ok((
        StatusCode::CREATED,
        Json(RegisterNodesResponse {
            message: "New nodes have been added".to_string(),
            total_nodes,
        }),
    ))
}

/// GET /nodes/resolve response
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub message: String,
    pub chain: Vec<Block>,
}

/// GET /nodes/resolve - run consensus against all known peers
pub async fn resolve_conflicts(State(state): State<Arc<RpcState>>) -> Json<ResolveResponse> {
    let replaced = state.resolver.resolve(&state.ledger, &state.peers).await;

    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };

    Json(ResolveResponse {
        message: message.to_string(),
        chain: state.ledger.lock().unwrap().chain_snapshot(),
    })
}
