//! Types produced by the bank SMS parser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of money movement for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
	Debit,
	Credit,
}

impl TransactionType {
	/// Classify a matched type keyword. Outgoing keywords are debits, everything else credits.
	pub fn from_keyword(keyword: &str) -> Self {
		match keyword.to_ascii_lowercase().as_str() {
			"debited" | "spent" | "paid" | "sent" => TransactionType::Debit,
			_ => TransactionType::Credit,
		}
	}
}

impl fmt::Display for TransactionType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransactionType::Debit => f.write_str("debit"),
			TransactionType::Credit => f.write_str("credit"),
		}
	}
}

/// Bank tag of the template that recognized a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bank {
	#[serde(rename = "HDFC")]
	Hdfc,
	#[serde(rename = "SBI")]
	Sbi,
	#[serde(rename = "ICICI")]
	Icici,
	#[serde(rename = "AXIS")]
	Axis,
	#[serde(rename = "Paytm")]
	Paytm,
	#[serde(rename = "UPI")]
	Upi,
}

impl Bank {
	pub fn as_str(&self) -> &'static str {
		match self {
			Bank::Hdfc => "HDFC",
			Bank::Sbi => "SBI",
			Bank::Icici => "ICICI",
			Bank::Axis => "AXIS",
			Bank::Paytm => "Paytm",
			Bank::Upi => "UPI",
		}
	}
}

impl fmt::Display for Bank {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A transaction extracted from one bank notification message.
///
/// This is the payload committed into ledger blocks, so its JSON shape is part of the
/// persisted chain format and feeds the block hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParsedTransaction {
	/// Transaction amount, never negative.
	pub amount: f64,
	#[serde(rename = "type")]
	pub kind: TransactionType,
	/// Cleaned merchant or counterparty name, at most 50 characters.
	pub merchant: String,
	/// When the message was received.
	pub date: DateTime<Utc>,
	pub bank_name: Bank,
	/// Last four account digits, or `"****"` when the message does not show them.
	pub account_last4: String,
	/// Balance reported by the message, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub balance: Option<f64>,
	/// Normalized message text.
	pub raw_message: String,
}
