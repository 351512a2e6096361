//! Block hashing and proof-of-work mining.

use crate::ledger::types::{Block, BlockData, GENESIS_PREVIOUS_HASH, LedgerError};

use sha2::{Digest, Sha256};
use tracing::debug;

/// Hash the block fields and return lowercase hex.
///
/// The digest input is the decimal index, decimal timestamp, canonical JSON of the payload,
/// previous hash and decimal nonce, concatenated as one string.
pub fn calculate_hash(
	index: u64,
	timestamp: i64,
	data: &BlockData,
	previous_hash: &str,
	nonce: u64,
) -> Result<String, LedgerError> {
	let data_json = serde_json::to_string(data)?;
	Ok(hash_fields(index, timestamp, &data_json, previous_hash, nonce))
}

fn hash_fields(index: u64, timestamp: i64, data_json: &str, previous_hash: &str, nonce: u64) -> String {
	let mut hasher = Sha256::new();
	hasher.update(index.to_string().as_bytes());
	hasher.update(timestamp.to_string().as_bytes());
	hasher.update(data_json.as_bytes());
	hasher.update(previous_hash.as_bytes());
	hasher.update(nonce.to_string().as_bytes());
	hex::encode(hasher.finalize())
}

/// Whether a hex digest meets the difficulty target.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
	hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

impl Block {
	/// Build the genesis block for a new chain. Genesis is hashed but never mined.
	pub fn genesis(timestamp: i64) -> Result<Self, LedgerError> {
		let data = BlockData::genesis();
		let hash = calculate_hash(0, timestamp, &data, GENESIS_PREVIOUS_HASH, 0)?;
		Ok(Self {
			index: 0,
			timestamp,
			data,
			previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
			hash,
			nonce: 0,
		})
	}

	/// Build an unmined candidate that extends `previous`.
	pub fn candidate(previous: &Block, timestamp: i64, data: BlockData) -> Self {
		Self {
			index: previous.index + 1,
			timestamp,
			data,
			previous_hash: previous.hash.clone(),
			hash: String::new(),
			nonce: 0,
		}
	}

	/// Recompute the hash of this block from its own fields.
	pub fn calculate_hash(&self) -> Result<String, LedgerError> {
		calculate_hash(
			self.index,
			self.timestamp,
			&self.data,
			&self.previous_hash,
			self.nonce,
		)
	}

	/// Whether the stored hash matches the block fields.
	pub fn has_valid_hash(&self) -> bool {
		matches!(self.calculate_hash(), Ok(hash) if hash == self.hash)
	}

	/// Search for a nonce whose hash meets `difficulty`, starting from the current nonce.
	///
	/// Gives up with [`LedgerError::MiningExhausted`] after `max_attempts` increments.
	pub fn mine(mut self, difficulty: usize, max_attempts: u64) -> Result<Self, LedgerError> {
		// Payload serialization does not depend on the nonce.
		let data_json = serde_json::to_string(&self.data)?;
		let mut attempts = 0u64;

		self.hash = hash_fields(
			self.index,
			self.timestamp,
			&data_json,
			&self.previous_hash,
			self.nonce,
		);
		while !meets_difficulty(&self.hash, difficulty) {
			if attempts >= max_attempts {
				return Err(LedgerError::MiningExhausted {
					index: self.index,
					attempts,
				});
			}
			self.nonce += 1;
			attempts += 1;
			self.hash = hash_fields(
				self.index,
				self.timestamp,
				&data_json,
				&self.previous_hash,
				self.nonce,
			);
		}

		debug!(
			"Mined block {} with nonce {} after {} attempts",
			self.index, self.nonce, attempts
		);
		Ok(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample_candidate() -> Block {
		let genesis = Block::genesis(1_700_000_000_000).expect("genesis");
		Block::candidate(
			&genesis,
			1_700_000_100_000,
			BlockData::Opaque(json!({ "note": "coffee" })),
		)
	}

	#[test]
	fn test_hash_is_deterministic_lowercase_hex() {
		let data = BlockData::genesis();
		let a = calculate_hash(3, 42, &data, "abc", 7).unwrap();
		let b = calculate_hash(3, 42, &data, "abc", 7).unwrap();
		assert_eq!(a, b);
		assert_eq!(a.len(), 64);
		assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}

	#[test]
	fn test_hash_covers_every_field() {
		let data = BlockData::genesis();
		let base = calculate_hash(1, 100, &data, "prev", 0).unwrap();
		assert_ne!(base, calculate_hash(2, 100, &data, "prev", 0).unwrap());
		assert_ne!(base, calculate_hash(1, 101, &data, "prev", 0).unwrap());
		assert_ne!(base, calculate_hash(1, 100, &data, "prev2", 0).unwrap());
		assert_ne!(base, calculate_hash(1, 100, &data, "prev", 1).unwrap());
		assert_ne!(
			base,
			calculate_hash(1, 100, &BlockData::Opaque(json!({})), "prev", 0).unwrap()
		);
	}

	#[test]
	fn test_genesis_block_shape() {
		let genesis = Block::genesis(5).unwrap();
		assert_eq!(genesis.index, 0);
		assert_eq!(genesis.previous_hash, "0");
		assert_eq!(genesis.nonce, 0);
		assert_eq!(genesis.data, BlockData::genesis());
		assert!(genesis.has_valid_hash());
	}

	#[test]
	fn test_mined_block_meets_difficulty_two() {
		for i in 0..10 {
			let mut candidate = sample_candidate();
			candidate.timestamp += i;
			let mined = candidate.mine(2, 10_000_000).unwrap();
			assert!(mined.hash.starts_with("00"), "hash {} lacks prefix", mined.hash);
			assert!(mined.has_valid_hash());
		}
	}

	#[test]
	fn test_candidate_links_to_previous() {
		let genesis = Block::genesis(1).unwrap();
		let candidate = Block::candidate(&genesis, 2, BlockData::genesis());
		assert_eq!(candidate.index, 1);
		assert_eq!(candidate.previous_hash, genesis.hash);
		assert_eq!(candidate.nonce, 0);
	}

	#[test]
	fn test_mining_gives_up_at_attempt_cap() {
		// 64 leading zeros is unreachable in practice.
		let result = sample_candidate().mine(64, 50);
		match result {
			Err(LedgerError::MiningExhausted { index, attempts }) => {
				assert_eq!(index, 1);
				assert_eq!(attempts, 50);
			}
			other => panic!("expected MiningExhausted, got {:?}", other),
		}
	}

	#[test]
	fn test_meets_difficulty() {
		assert!(meets_difficulty("00ab", 2));
		assert!(!meets_difficulty("0a0b", 2));
		assert!(meets_difficulty("anything", 0));
		assert!(!meets_difficulty("0", 2));
	}
}
