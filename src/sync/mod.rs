//! SMS Synchronization Module
//!
//! This module provides the services that move bank messages into the ledger:
//!
//! - `orchestrator`: The main entry point. Owns the ledger, runs manual and scheduled sync passes and reports status.
//! - `progress_tracker`: Counts per-message outcomes of a pass and summarizes them.
//! - `repositories`: Persistence of the "last synced at" marker.
//! - `types`: Configuration, consumer-facing records, the sink trait and sync errors.
//!
//! A pass fetches raw messages, parses them, drops duplicates of transactions already in the ledger, commits
//! the rest and hands the resulting domain transactions to the consumer's sink in one batch.

/// Main coordinator for the sync process
pub mod orchestrator;
/// Tracks the outcome of each sync pass
pub mod progress_tracker;
/// Last-sync marker persistence
pub mod repositories;
/// Configuration, records and errors
pub mod types;

pub use orchestrator::*;
pub use progress_tracker::SyncStats;
pub use repositories::{
	FileSyncStateRepository, LAST_SYNC_FILE_NAME, MemorySyncStateRepository, SyncStateRepository,
};
pub use types::*;
