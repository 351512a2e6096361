//! Bank SMS parsing
//!
//! Turns free-text bank notifications into structured transactions and infers a spending
//! category for the merchant. Everything here is stateless.

/// Merchant categorization by keyword
mod category;
/// Template-driven message parser
mod parser;
/// Parsed transaction types
mod types;

pub use category::{Category, categorize_merchant};
pub use parser::{
	MAX_MERCHANT_LEN, UNKNOWN_ACCOUNT, clean_merchant_name, normalize_message, parse_bank_sms,
};
pub use types::*;
