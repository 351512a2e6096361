//! Message sources for the sync pass.
//!
//! Real message acquisition (phone inbox access, gateways) lives outside this crate. The sync
//! orchestrator only sees the [`MessageSource`] trait, and an empty fetch means nothing new.

use crate::messages::types::{MessageSourceError, RawMessage};

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// Source of raw bank messages
#[async_trait::async_trait]
pub trait MessageSource: Send + Sync {
	/// Fetch the currently available messages. Order and volume are unspecified.
	async fn fetch_messages(&self) -> Result<Vec<RawMessage>, MessageSourceError>;

	/// Get the name of this source for logging and diagnostics.
	fn name(&self) -> &'static str;
}

/// Source that never yields anything.
#[derive(Debug, Default, Clone)]
pub struct NoopMessageSource;

#[async_trait::async_trait]
impl MessageSource for NoopMessageSource {
	async fn fetch_messages(&self) -> Result<Vec<RawMessage>, MessageSourceError> {
		Ok(Vec::new())
	}

	fn name(&self) -> &'static str {
		"NoopMessageSource"
	}
}

/// In-memory source returning whatever messages it currently holds.
#[derive(Debug, Default)]
pub struct StaticMessageSource {
	messages: Mutex<Vec<RawMessage>>,
}

impl StaticMessageSource {
	pub fn new(messages: Vec<RawMessage>) -> Self {
		Self {
			messages: Mutex::new(messages),
		}
	}

	/// Replace the messages returned by later fetches.
	pub fn set_messages(&self, messages: Vec<RawMessage>) {
		*self
			.messages
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = messages;
	}
}

#[async_trait::async_trait]
impl MessageSource for StaticMessageSource {
	async fn fetch_messages(&self) -> Result<Vec<RawMessage>, MessageSourceError> {
		Ok(self
			.messages
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone())
	}

	fn name(&self) -> &'static str {
		"StaticMessageSource"
	}
}

/// Source reading a JSON array of `{ "body", "timestamp" }` records from a file.
///
/// The file is re-read on every fetch, so an exporter can keep appending to it.
#[derive(Debug, Clone)]
pub struct FileMessageSource {
	path: PathBuf,
}

impl FileMessageSource {
	pub fn new(path: PathBuf) -> Self {
		Self { path }
	}
}

#[async_trait::async_trait]
impl MessageSource for FileMessageSource {
	async fn fetch_messages(&self) -> Result<Vec<RawMessage>, MessageSourceError> {
		if !tokio::fs::try_exists(&self.path).await? {
			debug!("Message file {:?} does not exist yet", self.path);
			return Ok(Vec::new());
		}

		let content = tokio::fs::read_to_string(&self.path).await?;
		if content.trim().is_empty() {
			return Ok(Vec::new());
		}

		let messages: Vec<RawMessage> = serde_json::from_str(&content)?;
		info!("Read {} messages from {:?}", messages.len(), self.path);
		Ok(messages)
	}

	fn name(&self) -> &'static str {
		"FileMessageSource"
	}
}
