use crate::ledger::types::{Block, LedgerError};

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// File name of the persisted chain inside the data directory.
pub const CHAIN_FILE_NAME: &str = "fintrack_blockchain.json";

/// Repository for whole-chain persistence
#[async_trait::async_trait]
pub trait ChainRepository: Send + Sync {
	/// Replace the stored chain with `chain`.
	async fn save(&self, chain: &[Block]) -> Result<(), LedgerError>;
	/// Load the stored chain, or `None` if nothing was ever saved.
	async fn load(&self) -> Result<Option<Vec<Block>>, LedgerError>;
}

/// File-based implementation of ChainRepository
pub struct FileChainRepository {
	data_dir: PathBuf,
}

impl FileChainRepository {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	pub fn chain_path(&self) -> PathBuf {
		self.data_dir.join(CHAIN_FILE_NAME)
	}

	fn temp_path(&self) -> PathBuf {
		self.data_dir.join(format!("{}.tmp", CHAIN_FILE_NAME))
	}
}

#[async_trait::async_trait]
impl ChainRepository for FileChainRepository {
	async fn save(&self, chain: &[Block]) -> Result<(), LedgerError> {
		tokio::fs::create_dir_all(&self.data_dir).await?;

		let content = serde_json::to_string(chain)?;

		// Write then rename so readers never see a half-written chain.
		let temp_path = self.temp_path();
		tokio::fs::write(&temp_path, content).await?;
		tokio::fs::rename(&temp_path, self.chain_path()).await?;

		debug!(
			"Saved chain of {} blocks to {:?}",
			chain.len(),
			self.chain_path()
		);
		Ok(())
	}

	async fn load(&self) -> Result<Option<Vec<Block>>, LedgerError> {
		let path = self.chain_path();
		if !tokio::fs::try_exists(&path).await? {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(&path).await?;
		let chain: Vec<Block> = serde_json::from_str(&content)?;

		info!("Loaded chain of {} blocks from {:?}", chain.len(), path);
		Ok(Some(chain))
	}
}

/// In-memory implementation of ChainRepository.
///
/// Holds the serialized chain, so loads go through the same JSON decoding as the file store.
#[derive(Default)]
pub struct MemoryChainRepository {
	stored: Mutex<Option<String>>,
}

impl MemoryChainRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Raw JSON currently stored, if any.
	pub fn stored_json(&self) -> Option<String> {
		self.stored
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}
}

#[async_trait::async_trait]
impl ChainRepository for MemoryChainRepository {
	async fn save(&self, chain: &[Block]) -> Result<(), LedgerError> {
		let content = serde_json::to_string(chain)?;
		*self
			.stored
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(content);
		Ok(())
	}

	async fn load(&self) -> Result<Option<Vec<Block>>, LedgerError> {
		match self.stored_json() {
			Some(content) => Ok(Some(serde_json::from_str(&content)?)),
			None => Ok(None),
		}
	}
}
