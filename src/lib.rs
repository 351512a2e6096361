//! Tamper-evident personal-finance ledger with bank SMS ingestion.
//!
//! Bank notification messages are parsed into structured transactions, deduplicated and
//! committed to a hash-chained ledger with a light proof-of-work. The consuming application
//! receives category-enriched transactions through a sink and reads ledger health through
//! [`sync::SmsSyncService::status`].

pub mod ledger;
pub mod messages;
pub mod sms;
pub mod sync;
pub mod utils;
