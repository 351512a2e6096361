//! Per-pass bookkeeping for message synchronization.
//!
//! The `SyncPassTracker` counts what happened to every fetched message during one pass, so
//! the orchestrator can log a summary and return statistics to the caller.

use std::time::{Duration, Instant};

/// Counts the outcome of each message in one sync pass
#[derive(Debug, Clone)]
pub struct SyncPassTracker {
	started: Instant,
	fetched: usize,
	unmatched: usize,
	duplicates: usize,
	committed: usize,
	failed: usize,
}

impl SyncPassTracker {
	/// Create a tracker for a pass over `fetched` messages.
	pub fn new(fetched: usize) -> Self {
		Self {
			started: Instant::now(),
			fetched,
			unmatched: 0,
			duplicates: 0,
			committed: 0,
			failed: 0,
		}
	}

	/// No bank template recognized the message
	pub fn record_unmatched(&mut self) {
		self.unmatched += 1;
	}

	/// The message matched a transaction already in the ledger
	pub fn record_duplicate(&mut self) {
		self.duplicates += 1;
	}

	/// A new block was committed for the message
	pub fn record_committed(&mut self) {
		self.committed += 1;
	}

	/// The message could not be committed
	pub fn record_failed(&mut self) {
		self.failed += 1;
	}

	/// Get sync statistics as a SyncStats struct
	pub fn get_stats(&self) -> SyncStats {
		SyncStats {
			fetched: self.fetched,
			unmatched: self.unmatched,
			duplicates: self.duplicates,
			committed: self.committed,
			failed: self.failed,
			elapsed: self.started.elapsed(),
		}
	}
}

/// Statistics about one sync pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStats {
	pub fetched: usize,
	pub unmatched: usize,
	pub duplicates: usize,
	pub committed: usize,
	pub failed: usize,
	pub elapsed: Duration,
}

impl SyncStats {
	/// Get a human-readable summary of the pass
	pub fn summary(&self) -> String {
		format!(
			"{} messages: {} committed, {} duplicates, {} unmatched in {} ms{}",
			self.fetched,
			self.committed,
			self.duplicates,
			self.unmatched,
			self.elapsed.as_millis(),
			if self.failed == 0 {
				String::new()
			} else {
				format!(" ({} failed)", self.failed)
			}
		)
	}
}
