//! Tamper-evident transaction ledger
//!
//! This module provides the hash-chained ledger that stores every accepted transaction. Each
//! block commits to its predecessor's hash and carries a small proof-of-work, so edits to
//! history show up when the chain is validated.

/// Block hashing and mining
mod block;
/// The ledger itself and chain validation
mod chain;
/// Chain persistence backends
mod repository;
/// Type definitions for blocks, payloads, configuration and errors
mod types;

pub use block::{calculate_hash, meets_difficulty};
pub use chain::{TransactionLedger, parse_exported_chain, validate_chain};
pub use repository::{CHAIN_FILE_NAME, ChainRepository, FileChainRepository, MemoryChainRepository};
pub use types::*;
