//! Bank SMS parsing.
//!
//! Messages are matched against an ordered list of bank templates. Each template pairs an
//! amount-and-counterparty pattern with a type-keyword pattern. Templates overlap heavily, so
//! the order of [`TEMPLATES`] decides which bank tag wins for ambiguous messages.

use crate::sms::types::{Bank, ParsedTransaction, TransactionType};

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Longest merchant name kept after cleanup.
pub const MAX_MERCHANT_LEN: usize = 50;

/// Placeholder used when a message shows no masked account digits.
pub const UNKNOWN_ACCOUNT: &str = "****";

/// One bank-specific extraction strategy.
struct BankTemplate {
	bank: Bank,
	/// Captures the amount (group 1) and the counterparty (group 2).
	pattern: Regex,
	/// Captures the transaction keyword (group 1).
	type_pattern: Regex,
}

impl BankTemplate {
	fn new(bank: Bank, pattern: &str, type_pattern: &str) -> Self {
		Self {
			bank,
			pattern: Regex::new(pattern).expect("bank template pattern must compile"),
			type_pattern: Regex::new(type_pattern).expect("bank type pattern must compile"),
		}
	}

	/// Extract a transaction from an already normalized message, or decline.
	fn extract(&self, message: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
		let captures = self.pattern.captures(message)?;
		let type_captures = self.type_pattern.captures(message)?;

		let amount = parse_amount(captures.get(1)?.as_str())?;
		let merchant = clean_merchant_name(captures.get(2)?.as_str());
		if merchant.is_empty() {
			return None;
		}

		Some(ParsedTransaction {
			amount,
			kind: TransactionType::from_keyword(type_captures.get(1)?.as_str()),
			merchant,
			date: received_at,
			bank_name: self.bank,
			account_last4: extract_account_last4(message),
			balance: extract_balance(message),
			raw_message: message.to_string(),
		})
	}
}

/// Bank templates in priority order.
static TEMPLATES: LazyLock<Vec<BankTemplate>> = LazyLock::new(|| {
	vec![
		BankTemplate::new(
			Bank::Hdfc,
			r"(?i)(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)\s+(?:debited|credited|spent|received).*?(?:at|on|from)\s+([A-Z0-9\s]+?)(?:\s+on|\s+A/C)",
			r"(?i)(debited|credited|spent|received)",
		),
		BankTemplate::new(
			Bank::Sbi,
			r"(?i)(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)\s+(?:debited|credited).*?(?:to|from)\s+([A-Z0-9\s]+)",
			r"(?i)(debited|credited)",
		),
		BankTemplate::new(
			Bank::Icici,
			r"(?i)(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)\s+(?:debited|credited).*?(?:at|on)\s+([A-Z0-9\s]+)",
			r"(?i)(debited|credited)",
		),
		BankTemplate::new(
			Bank::Axis,
			r"(?i)(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)\s+(?:debited|credited|spent).*?(?:at|on|via)\s+([A-Z0-9\s]+)",
			r"(?i)(debited|credited|spent)",
		),
		BankTemplate::new(
			Bank::Paytm,
			r"(?i)(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)\s+(?:paid|received).*?(?:to|from)\s+([A-Z0-9\s]+)",
			r"(?i)(paid|received)",
		),
		BankTemplate::new(
			Bank::Upi,
			r"(?i)(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)\s+(?:sent|received|debited|credited).*?(?:to|from)\s+([A-Z0-9@\s]+)",
			r"(?i)(sent|received|debited|credited)",
		),
	]
});

static MASKED_X_ACCOUNT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)X{2,}([0-9]{4})").expect("account pattern must compile"));

static MASKED_STAR_ACCOUNT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\*{2,}([0-9]{4})").expect("account pattern must compile"));

static BALANCE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)(?:balance|bal|avbl|available).*?(?:Rs\.?|INR)\s?([0-9,]+\.?[0-9]*)")
		.expect("balance pattern must compile")
});

/// Extract a transaction from one bank notification message.
///
/// Returns `None` when no template recognizes the message. That is the normal outcome for
/// non-bank text and is not an error.
pub fn parse_bank_sms(message: &str, received_at: DateTime<Utc>) -> Option<ParsedTransaction> {
	let clean_message = normalize_message(message);

	let parsed = TEMPLATES
		.iter()
		.find_map(|template| template.extract(&clean_message, received_at));

	match &parsed {
		Some(tx) => debug!(
			"Parsed {} {} of {} at {}",
			tx.bank_name, tx.kind, tx.amount, tx.merchant
		),
		None => debug!("No bank template matched message"),
	}
	parsed
}

/// Join every whitespace run, newlines included, into one space and trim the ends.
pub fn normalize_message(message: &str) -> String {
	message.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace, drop everything but ASCII letters, digits and spaces, trim and
/// truncate to [`MAX_MERCHANT_LEN`] characters.
pub fn clean_merchant_name(merchant: &str) -> String {
	let collapsed = merchant.split_whitespace().collect::<Vec<_>>().join(" ");
	let kept: String = collapsed
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
		.collect();
	kept.trim().chars().take(MAX_MERCHANT_LEN).collect()
}

fn parse_amount(raw: &str) -> Option<f64> {
	let amount: f64 = raw.replace(',', "").parse().ok()?;
	amount.is_finite().then_some(amount)
}

fn extract_account_last4(message: &str) -> String {
	MASKED_X_ACCOUNT
		.captures(message)
		.or_else(|| MASKED_STAR_ACCOUNT.captures(message))
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_string())
		.unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string())
}

fn extract_balance(message: &str) -> Option<f64> {
	BALANCE
		.captures(message)
		.and_then(|caps| caps.get(1))
		.and_then(|m| parse_amount(m.as_str()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn received() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 10, 12, 14, 5, 0).unwrap()
	}

	#[test]
	fn test_parse_basic_debit() {
		let tx = parse_bank_sms("Rs.450.00 debited at ZOMATO on 12-10-25", received())
			.expect("message should parse");
		assert_eq!(tx.amount, 450.0);
		assert_eq!(tx.kind, TransactionType::Debit);
		assert_eq!(tx.merchant, "ZOMATO");
		assert_eq!(tx.bank_name, Bank::Hdfc);
		assert_eq!(tx.account_last4, UNKNOWN_ACCOUNT);
		assert_eq!(tx.balance, None);
		assert_eq!(tx.date, received());
		assert_eq!(tx.raw_message, "Rs.450.00 debited at ZOMATO on 12-10-25");
	}

	#[test]
	fn test_parse_rejects_non_bank_text() {
		assert!(parse_bank_sms("random non-bank text", received()).is_none());
		assert!(parse_bank_sms("", received()).is_none());
		assert!(parse_bank_sms("Your OTP is 123456. Do not share.", received()).is_none());
	}

	#[test]
	fn test_parse_extracts_account_and_balance() {
		let tx = parse_bank_sms(
			"Rs.1,299.00 spent at AMAZON PAY on 12-10-25 from card XX4321. Avbl bal Rs.5,000.50",
			received(),
		)
		.unwrap();
		assert_eq!(tx.bank_name, Bank::Hdfc);
		assert_eq!(tx.amount, 1299.0);
		assert_eq!(tx.kind, TransactionType::Debit);
		assert_eq!(tx.merchant, "AMAZON PAY");
		assert_eq!(tx.account_last4, "4321");
		assert_eq!(tx.balance, Some(5000.5));
	}

	#[test]
	fn test_parse_star_masked_account() {
		let tx = parse_bank_sms("Rs.99 debited at JIO on 01-10-25 card **7788", received()).unwrap();
		assert_eq!(tx.account_last4, "7788");
		assert_eq!(tx.merchant, "JIO");
	}

	#[test]
	fn test_parse_normalizes_newlines() {
		let tx = parse_bank_sms("  Rs.450.00 debited\nat ZOMATO\r\non 12-10-25\n", received()).unwrap();
		assert_eq!(tx.raw_message, "Rs.450.00 debited at ZOMATO on 12-10-25");
		assert_eq!(tx.merchant, "ZOMATO");
	}

	#[test]
	fn test_parse_sbi_credit() {
		let tx = parse_bank_sms("INR 15,000.00 credited to ACME CORP", received()).unwrap();
		assert_eq!(tx.bank_name, Bank::Sbi);
		assert_eq!(tx.kind, TransactionType::Credit);
		assert_eq!(tx.amount, 15000.0);
		assert_eq!(tx.merchant, "ACME CORP");
	}

	#[test]
	fn test_parse_icici_without_trailing_date() {
		let tx = parse_bank_sms("Rs 320 debited at PVR CINEMAS", received()).unwrap();
		assert_eq!(tx.bank_name, Bank::Icici);
		assert_eq!(tx.merchant, "PVR CINEMAS");
		assert_eq!(tx.amount, 320.0);
	}

	#[test]
	fn test_parse_axis_via_keyword() {
		let tx = parse_bank_sms("Rs.100 spent via PAYZAPP CARD", received()).unwrap();
		assert_eq!(tx.bank_name, Bank::Axis);
		assert_eq!(tx.kind, TransactionType::Debit);
		assert_eq!(tx.merchant, "PAYZAPP CARD");
		assert_eq!(tx.amount, 100.0);
	}

	#[test]
	fn test_parse_is_case_insensitive() {
		let tx = parse_bank_sms("INR 2,500 DEBITED at BIGBASKET on 1-1", received()).unwrap();
		assert_eq!(tx.bank_name, Bank::Hdfc);
		assert_eq!(tx.kind, TransactionType::Debit);
		assert_eq!(tx.merchant, "BIGBASKET");
		assert_eq!(tx.amount, 2500.0);
	}

	#[test]
	fn test_only_ascii_digits_are_numbers() {
		let tx = parse_bank_sms("Rs.99 debited at JIO on 01-10-25 card XX१२३४", received()).unwrap();
		assert_eq!(tx.account_last4, UNKNOWN_ACCOUNT);

		let tx = parse_bank_sms("Rs.99 debited at JIO on 01-10-25 Avbl bal Rs.५००", received()).unwrap();
		assert_eq!(tx.balance, None);

		assert!(parse_bank_sms("Rs.४५० debited at ZOMATO on 12-10-25", received()).is_none());
	}

	#[test]
	fn test_parse_paytm_paid_and_received() {
		let paid = parse_bank_sms("Rs.250 paid to RAPIDO", received()).unwrap();
		assert_eq!(paid.bank_name, Bank::Paytm);
		assert_eq!(paid.kind, TransactionType::Debit);
		assert_eq!(paid.merchant, "RAPIDO");

		let got = parse_bank_sms("Rs 1,000 received from JOHN DOE", received()).unwrap();
		assert_eq!(got.bank_name, Bank::Paytm);
		assert_eq!(got.kind, TransactionType::Credit);
		assert_eq!(got.merchant, "JOHN DOE");
		assert_eq!(got.amount, 1000.0);
	}

	#[test]
	fn test_parse_upi_fallback_strips_handle_symbols() {
		let tx = parse_bank_sms("Rs 500 sent to rahul@okaxis", received()).unwrap();
		assert_eq!(tx.bank_name, Bank::Upi);
		assert_eq!(tx.kind, TransactionType::Debit);
		assert_eq!(tx.merchant, "rahulokaxis");
	}

	#[test]
	fn test_parse_declines_unparseable_amount() {
		assert!(parse_bank_sms("Rs., debited at SHOP on 01-01-25", received()).is_none());
	}

	#[test]
	fn test_clean_merchant_name() {
		assert_eq!(clean_merchant_name("  ZOMATO*ORDER#12  "), "ZOMATOORDER12");
		assert_eq!(clean_merchant_name("BIG \n  BAZAAR"), "BIG BAZAAR");
		let long = "A".repeat(80);
		assert_eq!(clean_merchant_name(&long).len(), MAX_MERCHANT_LEN);
		assert_eq!(clean_merchant_name("@@@"), "");
	}

	#[test]
	fn test_normalize_message() {
		assert_eq!(normalize_message("a\n b\t\tc  "), "a b c");
	}
}
