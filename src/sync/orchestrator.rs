//! SMS sync orchestrator and integration point for ledger ingestion.
//!
//! This module defines the `SmsSyncService`, which owns the transaction ledger and coordinates
//! the path from raw bank messages to committed blocks:
//! - Fetching raw messages from a pluggable `MessageSource`
//! - Parsing each message with the bank template parser
//! - Deduplicating against transactions already in the ledger
//! - Committing new transactions and reporting them to the consumer's sink
//! - Running passes on a fixed schedule until stopped
//!
//! All ledger access goes through one async mutex. A message's duplicate check and its commit
//! run under the same lock, so overlapping passes and manual entries cannot fork the chain or
//! commit the same event twice.

use crate::ledger::{LedgerError, TransactionLedger};
use crate::messages::{MessageSource, RawMessage};
use crate::sms::{ParsedTransaction, parse_bank_sms};
use crate::sync::{
	progress_tracker::{SyncPassTracker, SyncStats},
	repositories::SyncStateRepository,
	types::{DomainTransaction, SyncConfig, SyncError, SyncStatus, TransactionSink},
};
use crate::utils::{format_amount, format_local_time};

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as TokioMutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Ledger handle shared between the orchestrator and manual writers.
pub type SharedLedger = Arc<TokioMutex<TransactionLedger>>;

/// Whether `candidate` describes a transaction already present in `existing`.
///
/// A duplicate has the same normalized message text, or the same amount with receive times
/// strictly less than `window` apart.
pub fn is_duplicate<'a>(
	existing: impl IntoIterator<Item = &'a ParsedTransaction>,
	candidate: &ParsedTransaction,
	window: Duration,
) -> bool {
	let window_millis = window.as_millis();
	existing.into_iter().any(|tx| {
		if tx.raw_message == candidate.raw_message {
			return true;
		}
		let gap = (tx.date.timestamp_millis() - candidate.date.timestamp_millis()).unsigned_abs();
		tx.amount == candidate.amount && u128::from(gap) < window_millis
	})
}

/// Coordinates message ingestion into the ledger.
///
/// The service owns the ledger; consumers reach it through [`SmsSyncService::ledger`] so that
/// every writer shares the same lock.
pub struct SmsSyncService {
	context: Arc<SyncContext>,
	auto_sync: Option<AutoSync>,
}

/// State shared between the service and its scheduled task.
struct SyncContext {
	ledger: SharedLedger,
	source: Box<dyn MessageSource>,
	state_repository: Box<dyn SyncStateRepository>,
	last_sync: Mutex<DateTime<Utc>>,
	config: SyncConfig,
}

/// Handle to the scheduled sync task.
struct AutoSync {
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}

impl SmsSyncService {
	/// Create the service around an opened ledger.
	///
	/// Restores the persisted last-sync marker, falling back to the current time.
	pub async fn new(
		ledger: TransactionLedger,
		source: Box<dyn MessageSource>,
		state_repository: Box<dyn SyncStateRepository>,
		config: SyncConfig,
	) -> Self {
		let last_sync = match state_repository.load_last_sync().await {
			Ok(Some(at)) => at,
			Ok(None) => Utc::now(),
			Err(e) => {
				warn!("Could not restore last sync marker: {}", e);
				Utc::now()
			}
		};

		Self {
			context: Arc::new(SyncContext {
				ledger: Arc::new(TokioMutex::new(ledger)),
				source,
				state_repository,
				last_sync: Mutex::new(last_sync),
				config,
			}),
			auto_sync: None,
		}
	}

	/// Run one sync pass immediately, then repeat every `config.interval` until stopped.
	///
	/// A failed pass is logged and the schedule continues. Starting again replaces the
	/// previous schedule.
	pub fn start_auto_sync(&mut self, sink: Arc<dyn TransactionSink>) {
		self.stop_auto_sync();

		let context = self.context.clone();
		let period = context.config.interval.max(Duration::from_millis(1));
		let (shutdown, mut shutdown_rx) = watch::channel(false);

		info!("Starting SMS auto-sync every {:?}", period);
		let task = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				tokio::select! {
					// Shutdown wins over a tick that is already due.
					biased;

					// Also fires when the sender is dropped with the service.
					_ = shutdown_rx.changed() => break,
					_ = ticker.tick() => {
						if let Err(e) = context.run_pass(sink.as_ref()).await {
							error!("SMS sync failed: {}", e);
						}
					}
				}
			}

			info!("SMS auto-sync stopped");
		});

		self.auto_sync = Some(AutoSync { shutdown, task });
	}

	/// Stop the scheduled sync. An in-flight pass is allowed to finish. No-op if not started.
	pub fn stop_auto_sync(&mut self) {
		if let Some(auto_sync) = self.auto_sync.take() {
			let _ = auto_sync.shutdown.send(true);
			debug!("Requested SMS auto-sync shutdown");
		}
	}

	/// Stop the scheduled sync and wait for its task to end.
	pub async fn shutdown(&mut self) {
		if let Some(auto_sync) = self.auto_sync.take() {
			let _ = auto_sync.shutdown.send(true);
			if let Err(e) = auto_sync.task.await {
				warn!("SMS auto-sync task ended abnormally: {}", e);
			}
		}
	}

	/// Whether a sync schedule is active.
	pub fn is_auto_syncing(&self) -> bool {
		self.auto_sync
			.as_ref()
			.is_some_and(|auto_sync| !auto_sync.task.is_finished())
	}

	/// Run a single sync pass now.
	pub async fn sync_once(&self, sink: &dyn TransactionSink) -> Result<SyncStats, SyncError> {
		self.context.run_pass(sink).await
	}

	/// Snapshot of ledger integrity, size and last sync time.
	pub async fn status(&self) -> SyncStatus {
		let ledger = self.context.ledger.lock().await;
		SyncStatus {
			is_valid: ledger.is_valid(),
			block_count: ledger.len(),
			transaction_count: ledger.transaction_count(),
			last_sync: format_local_time(self.last_sync()),
		}
	}

	/// Time of the last pass that found new transactions.
	pub fn last_sync(&self) -> DateTime<Utc> {
		self.context.last_sync()
	}

	/// Full chain as pretty-printed JSON.
	pub async fn export_chain(&self) -> Result<String, LedgerError> {
		self.context.ledger.lock().await.export_chain()
	}

	/// Shared handle to the ledger for manual entries and reads.
	pub fn ledger(&self) -> SharedLedger {
		self.context.ledger.clone()
	}
}

impl SyncContext {
	fn last_sync(&self) -> DateTime<Utc> {
		*self
			.last_sync
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Fetch, parse, deduplicate and commit every available message.
	///
	/// Only a failing fetch fails the pass. Messages are isolated from each other: one that
	/// cannot be committed is logged and counted, and the rest are still processed.
	async fn run_pass(&self, sink: &dyn TransactionSink) -> Result<SyncStats, SyncError> {
		info!("Syncing messages from {}", self.source.name());

		let messages = self.source.fetch_messages().await?;
		let mut tracker = SyncPassTracker::new(messages.len());
		let mut new_transactions = Vec::new();

		for message in &messages {
			match self.process_message(message).await {
				Ok(MessageOutcome::Committed(tx)) => {
					info!(
						"New transaction added: {} {}",
						tx.merchant,
						format_amount(tx.amount)
					);
					tracker.record_committed();
					new_transactions.push(tx);
				}
				Ok(MessageOutcome::Duplicate) => tracker.record_duplicate(),
				Ok(MessageOutcome::Unmatched) => tracker.record_unmatched(),
				Err(e) => {
					error!("Failed to commit message received at {}: {}", message.timestamp, e);
					tracker.record_failed();
				}
			}
		}

		if new_transactions.is_empty() {
			info!("No new transactions found");
		} else {
			let count = new_transactions.len();
			sink.on_new_transactions(new_transactions);
			self.update_last_sync().await;
			info!("Synced {} new transactions", count);
		}

		let stats = tracker.get_stats();
		info!("Sync pass completed: {}", stats.summary());
		Ok(stats)
	}

	async fn process_message(&self, message: &RawMessage) -> Result<MessageOutcome, SyncError> {
		let Some(received_at) = message.received_at() else {
			debug!("Message timestamp {} is out of range", message.timestamp);
			return Ok(MessageOutcome::Unmatched);
		};

		let Some(parsed) = parse_bank_sms(&message.body, received_at) else {
			return Ok(MessageOutcome::Unmatched);
		};

		let mut ledger = self.ledger.lock().await;
		if is_duplicate(
			ledger.parsed_transactions(),
			&parsed,
			self.config.dedup_window,
		) {
			debug!(
				"Skipping duplicate transaction of {} at {}",
				parsed.amount, parsed.merchant
			);
			return Ok(MessageOutcome::Duplicate);
		}

		let block = ledger.add_transaction(parsed.clone()).await?;
		Ok(MessageOutcome::Committed(DomainTransaction::from_committed(
			block.index,
			&parsed,
		)))
	}

	async fn update_last_sync(&self) {
		let now = Utc::now();
		*self
			.last_sync
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = now;

		if let Err(e) = self.state_repository.save_last_sync(now).await {
			warn!("Failed to persist last sync marker: {}", e);
		}
	}
}

/// What happened to one fetched message.
enum MessageOutcome {
	Committed(DomainTransaction),
	Duplicate,
	Unmatched,
}
