//! Types for raw message acquisition

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One raw text message as delivered by a message source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
	/// Message text as received.
	pub body: String,
	/// Receive time in milliseconds since the Unix epoch.
	pub timestamp: i64,
}

impl RawMessage {
	pub fn new(body: impl Into<String>, timestamp: i64) -> Self {
		Self {
			body: body.into(),
			timestamp,
		}
	}

	/// Receive time as a UTC datetime, or `None` if the timestamp is out of range.
	pub fn received_at(&self) -> Option<DateTime<Utc>> {
		Utc.timestamp_millis_opt(self.timestamp).single()
	}
}

/// Error types for message sources
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum MessageSourceError {
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Message format error: {0}")]
	FormatError(#[from] serde_json::Error),

	#[error("Source error: {0}")]
	SourceError(String),
}
