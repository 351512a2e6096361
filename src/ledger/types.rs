//! Types for the hash-chained transaction ledger

use crate::sms::ParsedTransaction;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Marker payload carried by the genesis block of every chain.
pub const GENESIS_MESSAGE: &str = "Genesis Block - FinTrack AI";

/// Previous-hash value of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One committed, hash-linked record in the ledger.
///
/// The `hash` field covers every other field of the block, so any change to `index`,
/// `timestamp`, `data`, `previous_hash` or `nonce` after commit is detectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
	/// Position in the chain, genesis is 0.
	pub index: u64,
	/// Creation time in milliseconds since the Unix epoch.
	pub timestamp: i64,
	/// Payload wrapped by this block.
	pub data: BlockData,
	/// Hex digest of the previous block, `"0"` for genesis.
	pub previous_hash: String,
	/// Hex SHA-256 digest of this block.
	pub hash: String,
	/// Proof-of-work counter.
	pub nonce: u64,
}

/// Payload stored in a block.
///
/// Serialized untagged so the persisted JSON carries the payload object directly. On load a
/// typed variant is chosen only when it serializes back to exactly the stored JSON, otherwise
/// the payload stays [`BlockData::Opaque`]. The block hash covers that JSON, so it verifies
/// after any number of save and load cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockData {
	/// A transaction extracted from a bank message.
	Transaction(ParsedTransaction),
	/// The genesis marker.
	Genesis(GenesisMarker),
	/// Any other JSON payload.
	Opaque(Value),
}

/// Payload of the genesis block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisMarker {
	pub message: String,
}

impl BlockData {
	/// Genesis marker payload.
	pub fn genesis() -> Self {
		BlockData::Genesis(GenesisMarker {
			message: GENESIS_MESSAGE.to_string(),
		})
	}

	/// The parsed transaction carried by this payload, if any.
	pub fn as_transaction(&self) -> Option<&ParsedTransaction> {
		match self {
			BlockData::Transaction(tx) => Some(tx),
			_ => None,
		}
	}

	/// Classify a stored JSON payload.
	pub fn from_value(value: Value) -> Self {
		let Ok(stored) = serde_json::to_string(&value) else {
			return BlockData::Opaque(value);
		};
		if let Some(tx) = reproduces::<ParsedTransaction>(&value, &stored) {
			return BlockData::Transaction(tx);
		}
		if let Some(marker) = reproduces::<GenesisMarker>(&value, &stored) {
			return BlockData::Genesis(marker);
		}
		BlockData::Opaque(value)
	}
}

/// Decode `value` as `T` if `T` serializes back to the same JSON text.
fn reproduces<T: DeserializeOwned + Serialize>(value: &Value, stored: &str) -> Option<T> {
	let typed = T::deserialize(value).ok()?;
	let json = serde_json::to_string(&typed).ok()?;
	(json == stored).then_some(typed)
}

impl<'de> Deserialize<'de> for BlockData {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Value::deserialize(deserializer).map(BlockData::from_value)
	}
}

impl From<ParsedTransaction> for BlockData {
	fn from(tx: ParsedTransaction) -> Self {
		BlockData::Transaction(tx)
	}
}

/// Configuration for mining and chain growth.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
	/// Number of leading `'0'` hex digits a block hash must have.
	pub difficulty: usize,
	/// Upper bound on nonce attempts per block.
	pub max_mining_attempts: u64,
}

impl Default for LedgerConfig {
	fn default() -> Self {
		Self {
			difficulty: 2,
			max_mining_attempts: 10_000_000,
		}
	}
}

/// Error types for ledger operations and persistence
#[allow(clippy::enum_variant_names)]
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),

	#[error("Mining block {index} gave up after {attempts} attempts")]
	MiningExhausted { index: u64, attempts: u64 },

	#[error("Persisted chain has no genesis block")]
	EmptyChain,
}
