//! HTTP API Module
//!
//! Provides the request/response surface external callers drive the
//! ledger through.

mod methods;
mod server;

pub use methods::*;
pub use server::*;
