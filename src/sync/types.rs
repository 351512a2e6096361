use crate::ledger::LedgerError;
use crate::messages::MessageSourceError;
use crate::sms::{Category, ParsedTransaction, TransactionType, categorize_merchant};

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sync orchestrator
#[derive(Debug, Clone)]
pub struct SyncConfig {
	/// Time between scheduled sync passes
	pub interval: Duration,
	/// Two transactions with equal amounts closer than this are the same event
	pub dedup_window: Duration,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(60 * 60),
			dedup_window: Duration::from_secs(60),
		}
	}
}

/// Category-enriched transaction handed to the consuming application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTransaction {
	/// `sms-<block index>`
	pub id: String,
	pub merchant: String,
	pub amount: f64,
	#[serde(rename = "type")]
	pub kind: TransactionType,
	/// ISO-8601 UTC timestamp with millisecond precision.
	pub date: String,
	pub category: Category,
}

impl DomainTransaction {
	/// Build the consumer record for a transaction committed at `block_index`.
	pub fn from_committed(block_index: u64, tx: &ParsedTransaction) -> Self {
		Self {
			id: format!("sms-{}", block_index),
			merchant: tx.merchant.clone(),
			amount: tx.amount,
			kind: tx.kind,
			date: tx.date.to_rfc3339_opts(SecondsFormat::Millis, true),
			category: categorize_merchant(&tx.merchant),
		}
	}
}

/// Read-only snapshot of ledger health for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
	pub is_valid: bool,
	pub block_count: usize,
	pub transaction_count: usize,
	/// Last successful sync in local time.
	pub last_sync: String,
}

/// Receiver for transactions discovered by a sync pass.
///
/// Called at most once per pass, with the new transactions in commit order.
pub trait TransactionSink: Send + Sync {
	fn on_new_transactions(&self, transactions: Vec<DomainTransaction>);
}

impl<F> TransactionSink for F
where
	F: Fn(Vec<DomainTransaction>) + Send + Sync,
{
	fn on_new_transactions(&self, transactions: Vec<DomainTransaction>) {
		self(transactions)
	}
}

/// Error types for sync passes
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
	#[error("Ledger error: {0}")]
	LedgerError(#[from] LedgerError),

	#[error("Message source error: {0}")]
	SourceError(#[from] MessageSourceError),

	#[error("Persistence error: {0}")]
	PersistenceError(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sms::Bank;
	use chrono::{TimeZone, Utc};

	#[test]
	fn test_domain_transaction_from_committed() {
		let tx = ParsedTransaction {
			amount: 450.0,
			kind: TransactionType::Debit,
			merchant: "ZOMATO".to_string(),
			date: Utc.with_ymd_and_hms(2025, 10, 12, 14, 5, 0).unwrap(),
			bank_name: Bank::Hdfc,
			account_last4: "****".to_string(),
			balance: None,
			raw_message: "Rs.450.00 debited at ZOMATO on 12-10-25".to_string(),
		};

		let domain = DomainTransaction::from_committed(7, &tx);
		assert_eq!(domain.id, "sms-7");
		assert_eq!(domain.category, Category::Food);
		assert_eq!(domain.date, "2025-10-12T14:05:00.000Z");

		let json = serde_json::to_value(&domain).unwrap();
		assert_eq!(json["type"], "debit");
		assert_eq!(json["category"], "Food");
	}

	#[test]
	fn test_status_serializes_camel_case() {
		let status = SyncStatus {
			is_valid: true,
			block_count: 4,
			transaction_count: 3,
			last_sync: "10/12/2025, 2:05:00 PM".to_string(),
		};
		let json = serde_json::to_value(&status).unwrap();
		assert_eq!(json["isValid"], true);
		assert_eq!(json["blockCount"], 4);
		assert_eq!(json["transactionCount"], 3);
	}
}
