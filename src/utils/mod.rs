//!
//! Utility module for the ledger service.
//!
//! Formatting helpers for amounts and timestamps shown in logs and status output.
/// Display formatting
pub mod format;

pub use format::{format_amount, format_local_time};
