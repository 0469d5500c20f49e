//! Checkpoint store for processed blocks.
//!
//! The file implementation keeps one `<network>_last_block.txt` per network and, when a
//! network asks for it, a JSON dump of the last fetched range.

use async_trait::async_trait;
use glob::glob;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};
use tokio::io::AsyncWriteExt;

use crate::{models::BlockType, services::blockwatcher::BlockWatcherError};

/// Durable per-network progress.
///
/// Implementations must serialize writes for the same network; different networks use
/// different keys and never contend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockStorage: Send + Sync {
	/// Last block whose matches were fully dispatched, if any
	async fn get_last_processed_block(
		&self,
		network_id: &str,
	) -> Result<Option<u64>, BlockWatcherError>;

	/// Persists the checkpoint; must survive a process restart once it returns
	async fn save_last_processed_block(
		&self,
		network_id: &str,
		block: u64,
	) -> Result<(), BlockWatcherError>;

	async fn save_blocks(
		&self,
		network_id: &str,
		blocks: &[BlockType],
	) -> Result<(), BlockWatcherError>;

	async fn delete_blocks(&self, network_id: &str) -> Result<(), BlockWatcherError>;
}

/// File-based checkpoint store
#[derive(Clone)]
pub struct FileBlockStorage {
	storage_path: PathBuf,
}

impl Default for FileBlockStorage {
	fn default() -> Self {
		Self::new(PathBuf::from("data"))
	}
}

impl FileBlockStorage {
	pub fn new(storage_path: PathBuf) -> Self {
		FileBlockStorage { storage_path }
	}

	pub fn storage_path(&self) -> &Path {
		&self.storage_path
	}

	fn checkpoint_path(&self, network_id: &str) -> PathBuf {
		self.storage_path
			.join(format!("{}_last_block.txt", network_id))
	}

	fn metadata(network_id: &str, path: &Path) -> Option<HashMap<String, String>> {
		Some(HashMap::from([
			("network".to_string(), network_id.to_string()),
			("path".to_string(), path.display().to_string()),
		]))
	}

	/// Writes `contents` next to `path`, syncs it and renames it into place
	async fn write_atomically(
		&self,
		network_id: &str,
		path: &Path,
		contents: &[u8],
	) -> Result<(), BlockWatcherError> {
		let storage_error = |action: &str, e: std::io::Error| {
			BlockWatcherError::storage_error(
				format!("Failed to {} {}: {}", action, path.display(), e),
				Some(Box::new(e)),
				Self::metadata(network_id, path),
			)
		};

		tokio::fs::create_dir_all(&self.storage_path)
			.await
			.map_err(|e| storage_error("create directory for", e))?;

		let tmp_path = path.with_extension("tmp");
		let mut file = tokio::fs::File::create(&tmp_path)
			.await
			.map_err(|e| storage_error("create", e))?;
		file.write_all(contents)
			.await
			.map_err(|e| storage_error("write", e))?;
		file.sync_all()
			.await
			.map_err(|e| storage_error("sync", e))?;
		drop(file);

		tokio::fs::rename(&tmp_path, path)
			.await
			.map_err(|e| storage_error("replace", e))
	}
}

#[async_trait]
impl BlockStorage for FileBlockStorage {
	async fn get_last_processed_block(
		&self,
		network_id: &str,
	) -> Result<Option<u64>, BlockWatcherError> {
		let file_path = self.checkpoint_path(network_id);

		if !file_path.exists() {
			return Ok(None);
		}

		let content = tokio::fs::read_to_string(&file_path).await.map_err(|e| {
			BlockWatcherError::storage_error(
				format!("Failed to read checkpoint: {}", e),
				Some(Box::new(e)),
				Self::metadata(network_id, &file_path),
			)
		})?;

		let block_number = content.trim().parse::<u64>().map_err(|e| {
			BlockWatcherError::storage_error(
				format!("Corrupt checkpoint {:?}: {}", content.trim(), e),
				Some(Box::new(e)),
				Self::metadata(network_id, &file_path),
			)
		})?;

		Ok(Some(block_number))
	}

	async fn save_last_processed_block(
		&self,
		network_id: &str,
		block: u64,
	) -> Result<(), BlockWatcherError> {
		let file_path = self.checkpoint_path(network_id);
		self.write_atomically(network_id, &file_path, block.to_string().as_bytes())
			.await
	}

	async fn save_blocks(
		&self,
		network_id: &str,
		blocks: &[BlockType],
	) -> Result<(), BlockWatcherError> {
		let file_path = self.storage_path.join(format!(
			"{}_blocks_{}.json",
			network_id,
			chrono::Utc::now().timestamp()
		));
		let json = serde_json::to_vec(blocks).map_err(|e| {
			BlockWatcherError::storage_error(
				format!("Failed to serialize blocks: {}", e),
				Some(Box::new(e)),
				Self::metadata(network_id, &file_path),
			)
		})?;
		self.write_atomically(network_id, &file_path, &json).await
	}

	async fn delete_blocks(&self, network_id: &str) -> Result<(), BlockWatcherError> {
		let pattern = self
			.storage_path
			.join(format!("{}_blocks_*.json", network_id))
			.to_string_lossy()
			.to_string();

		let entries = glob(&pattern).map_err(|e| {
			BlockWatcherError::storage_error(
				format!("Invalid block file pattern: {}", e),
				Some(Box::new(e)),
				None,
			)
		})?;

		for path in entries.flatten() {
			tokio::fs::remove_file(&path).await.map_err(|e| {
				BlockWatcherError::storage_error(
					format!("Failed to delete {}: {}", path.display(), e),
					Some(Box::new(e)),
					Self::metadata(network_id, &path),
				)
			})?;
		}
		Ok(())
	}
}
