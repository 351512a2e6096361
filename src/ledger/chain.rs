//! The append-only transaction ledger.
//!
//! `TransactionLedger` owns the in-memory chain and the repository it is persisted to. Every
//! append mines a new block against the current tip, writes the full chain to storage and only
//! then extends the in-memory chain, so memory and storage never disagree about committed
//! blocks.
//!
//! Validation is never enforced on load or on append. A tampered chain loads, reports itself
//! invalid through [`TransactionLedger::is_valid`] and keeps accepting new blocks.

use crate::ledger::repository::ChainRepository;
use crate::ledger::types::{Block, BlockData, LedgerConfig, LedgerError};
use crate::sms::ParsedTransaction;

use chrono::Utc;
use tracing::{debug, info, warn};

/// Hash-chained, proof-of-work ledger of transactions.
pub struct TransactionLedger {
	chain: Vec<Block>,
	config: LedgerConfig,
	repository: Box<dyn ChainRepository>,
}

impl TransactionLedger {
	/// Load the persisted chain, or create and persist a fresh genesis-only chain.
	pub async fn open(
		repository: Box<dyn ChainRepository>,
		config: LedgerConfig,
	) -> Result<Self, LedgerError> {
		let chain = match repository.load().await? {
			Some(chain) if chain.is_empty() => return Err(LedgerError::EmptyChain),
			Some(chain) => {
				info!("Restored ledger with {} blocks", chain.len());
				chain
			}
			None => {
				let chain = vec![Block::genesis(Utc::now().timestamp_millis())?];
				repository.save(&chain).await?;
				info!("No persisted ledger found, created genesis block");
				chain
			}
		};

		Ok(Self {
			chain,
			config,
			repository,
		})
	}

	/// Mine and commit a new block carrying `payload`, returning the committed block.
	///
	/// The chain is persisted before the block becomes visible in memory. A persistence error
	/// leaves the ledger unchanged.
	pub async fn add_transaction(
		&mut self,
		payload: impl Into<BlockData>,
	) -> Result<Block, LedgerError> {
		let candidate = Block::candidate(
			self.tip(),
			Utc::now().timestamp_millis(),
			payload.into(),
		);
		let block = candidate.mine(self.config.difficulty, self.config.max_mining_attempts)?;

		self.chain.push(block);
		if let Err(e) = self.repository.save(&self.chain).await {
			self.chain.pop();
			warn!("Failed to persist chain, block discarded: {}", e);
			return Err(e);
		}

		let block = self.tip().clone();
		debug!("Committed block {} with hash {}", block.index, block.hash);
		Ok(block)
	}

	/// Recompute every non-genesis block hash and check the previous-hash links.
	pub fn is_valid(&self) -> bool {
		validate_chain(&self.chain)
	}

	/// Full chain in index order.
	pub fn chain(&self) -> &[Block] {
		&self.chain
	}

	/// Last committed block.
	pub fn tip(&self) -> &Block {
		// `open` guarantees at least the genesis block.
		&self.chain[self.chain.len() - 1]
	}

	/// Number of blocks including genesis.
	pub fn len(&self) -> usize {
		self.chain.len()
	}

	/// Payloads of every block after genesis, in append order.
	pub fn transactions(&self) -> impl Iterator<Item = &BlockData> {
		self.chain.iter().skip(1).map(|block| &block.data)
	}

	/// Parsed bank transactions stored after genesis, in append order.
	pub fn parsed_transactions(&self) -> impl Iterator<Item = &ParsedTransaction> {
		self.transactions().filter_map(BlockData::as_transaction)
	}

	/// Number of blocks after genesis.
	pub fn transaction_count(&self) -> usize {
		self.chain.len().saturating_sub(1)
	}

	/// Full chain as pretty-printed JSON, for backups.
	pub fn export_chain(&self) -> Result<String, LedgerError> {
		Ok(serde_json::to_string_pretty(&self.chain)?)
	}

	pub fn config(&self) -> &LedgerConfig {
		&self.config
	}
}

/// Check hashes and links of every block after genesis, stopping at the first fault.
pub fn validate_chain(chain: &[Block]) -> bool {
	for window in chain.windows(2) {
		let (previous, current) = (&window[0], &window[1]);

		if !current.has_valid_hash() {
			debug!("Block {} hash does not match its contents", current.index);
			return false;
		}

		if current.previous_hash != previous.hash {
			debug!(
				"Block {} does not link to block {}",
				current.index, previous.index
			);
			return false;
		}
	}
	true
}

/// Parse a chain produced by [`TransactionLedger::export_chain`].
pub fn parse_exported_chain(content: &str) -> Result<Vec<Block>, LedgerError> {
	let chain: Vec<Block> = serde_json::from_str(content)?;
	if chain.is_empty() {
		return Err(LedgerError::EmptyChain);
	}
	Ok(chain)
}
