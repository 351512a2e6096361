use crate::sync::types::SyncError;

use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// File name of the last-sync marker inside the data directory.
pub const LAST_SYNC_FILE_NAME: &str = "fintrack_last_sms_sync.json";

/// Repository for the "last synced at" marker
#[async_trait::async_trait]
pub trait SyncStateRepository: Send + Sync {
	async fn save_last_sync(&self, at: DateTime<Utc>) -> Result<(), SyncError>;
	async fn load_last_sync(&self) -> Result<Option<DateTime<Utc>>, SyncError>;
}

/// File-based implementation of SyncStateRepository
pub struct FileSyncStateRepository {
	data_dir: PathBuf,
}

impl FileSyncStateRepository {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	fn marker_path(&self) -> PathBuf {
		self.data_dir.join(LAST_SYNC_FILE_NAME)
	}
}

#[async_trait::async_trait]
impl SyncStateRepository for FileSyncStateRepository {
	async fn save_last_sync(&self, at: DateTime<Utc>) -> Result<(), SyncError> {
		let metadata = serde_json::json!({
			"last_sync": at.timestamp_millis(),
			"timestamp": at.to_rfc3339(),
		});

		tokio::fs::create_dir_all(&self.data_dir)
			.await
			.map_err(|e| {
				SyncError::PersistenceError(format!("Failed to create data directory: {}", e))
			})?;

		let content = serde_json::to_string_pretty(&metadata).map_err(|e| {
			SyncError::PersistenceError(format!("Failed to serialize last sync marker: {}", e))
		})?;

		let path = self.marker_path();
		tokio::fs::write(&path, content).await.map_err(|e| {
			SyncError::PersistenceError(format!("Failed to write last sync marker: {}", e))
		})?;

		debug!("Saved last sync marker {} to {:?}", at, path);
		Ok(())
	}

	async fn load_last_sync(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
		let path = self.marker_path();
		if !path.exists() {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
			SyncError::PersistenceError(format!("Failed to read last sync marker: {}", e))
		})?;

		let metadata: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
			SyncError::PersistenceError(format!("Failed to parse last sync marker: {}", e))
		})?;

		let Some(millis) = metadata.get("last_sync").and_then(|v| v.as_i64()) else {
			warn!("Last sync marker {:?} has no last_sync field", path);
			return Ok(None);
		};

		Ok(Utc.timestamp_millis_opt(millis).single())
	}
}

/// In-memory implementation of SyncStateRepository
#[derive(Default)]
pub struct MemorySyncStateRepository {
	last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl MemorySyncStateRepository {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait::async_trait]
impl SyncStateRepository for MemorySyncStateRepository {
	async fn save_last_sync(&self, at: DateTime<Utc>) -> Result<(), SyncError> {
		*self
			.last_sync
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(at);
		Ok(())
	}

	async fn load_last_sync(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
		Ok(*self
			.last_sync
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_file_marker_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let repo = FileSyncStateRepository::new(dir.path().to_path_buf());
		assert!(repo.load_last_sync().await.unwrap().is_none());

		let at = Utc.timestamp_millis_opt(1_760_263_200_123).unwrap();
		repo.save_last_sync(at).await.unwrap();
		assert_eq!(repo.load_last_sync().await.unwrap(), Some(at));

		let raw = std::fs::read_to_string(dir.path().join(LAST_SYNC_FILE_NAME)).unwrap();
		assert!(raw.contains("1760263200123"));
	}

	#[tokio::test]
	async fn test_file_marker_without_field_is_ignored() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(LAST_SYNC_FILE_NAME), "{}").unwrap();
		let repo = FileSyncStateRepository::new(dir.path().to_path_buf());
		assert!(repo.load_last_sync().await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_memory_marker_round_trip() {
		let repo = MemorySyncStateRepository::new();
		let at = Utc::now();
		repo.save_last_sync(at).await.unwrap();
		assert_eq!(repo.load_last_sync().await.unwrap(), Some(at));
	}
}
