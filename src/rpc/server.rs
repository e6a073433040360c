//! HTTP Server
//!
//! Axum-based server for the node's request/response surface.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::rpc::methods::{
    full_chain, mine, new_transaction, register_nodes, resolve_conflicts, RpcState,
};

/// Build the route table over shared handler state
pub fn build_router(state: Arc<RpcState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chain", get(full_chain))
        .route("/transactions/new", post(new_transaction))
        .route("/mine", get(mine))
        .route("/nodes/register", post(register_nodes))
        .route("/nodes/resolve", get(resolve_conflicts))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on local loopback at the specified port
pub async fn start_rpc_server(state: Arc<RpcState>, port: u16) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app).await
}
