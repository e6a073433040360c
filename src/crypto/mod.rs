//! Cryptography module - SHA-256 block digests

mod hash;

pub use hash::*;
