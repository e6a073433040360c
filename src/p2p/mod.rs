//! P2P module - peer registry, chain fetch transport, and consensus resolution

mod client;
mod peer;
mod sync;

pub use client::*;
pub use peer::*;
pub use sync::*;
