//! Per-network progress tracking.
//!
//! The [`ProgressTracker`] turns the stored checkpoint and the chain head into the next
//! range to process, and advances the checkpoint once a range has been fully handled.
//! The checkpoint never moves backwards.

use std::{collections::HashMap, sync::Arc};

use crate::{
	models::Network,
	services::blockwatcher::{BlockStorage, BlockWatcherError},
};

/// Inclusive range of block numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
	pub from: u64,
	pub to: u64,
}

impl BlockRange {
	/// Number of blocks in the range
	pub fn block_count(&self) -> u64 {
		self.to - self.from + 1
	}
}

/// Computes the next range to process.
///
/// * Without a checkpoint only the newest confirmed block is processed.
/// * With one, processing resumes right after it, at most `max_past_blocks` blocks at a time.
///
/// Returns `None` when there is nothing new (the chain has not advanced past the
/// checkpoint, or it is still shallower than the confirmation depth).
pub fn plan_range(
	checkpoint: Option<u64>,
	latest_block: u64,
	confirmation_blocks: u64,
	max_past_blocks: u64,
) -> Option<BlockRange> {
	let latest_confirmed = latest_block.checked_sub(confirmation_blocks)?;
	let max_past_blocks = max_past_blocks.max(1);

	let from = match checkpoint {
		Some(checkpoint) => checkpoint.checked_add(1)?,
		None => latest_confirmed,
	};
	let window_end = from.saturating_add(max_past_blocks - 1);
	let to = latest_confirmed.min(window_end);

	(from <= to).then_some(BlockRange { from, to })
}

/// Progress tracker for one network
pub struct ProgressTracker {
	network_slug: String,
	confirmation_blocks: u64,
	max_past_blocks: u64,
	storage: Arc<dyn BlockStorage>,
}

impl ProgressTracker {
	pub fn new(network: &Network, storage: Arc<dyn BlockStorage>) -> Self {
		Self {
			network_slug: network.slug.clone(),
			confirmation_blocks: network.confirmation_blocks,
			max_past_blocks: network.get_max_past_blocks(),
			storage,
		}
	}

	pub fn storage(&self) -> &Arc<dyn BlockStorage> {
		&self.storage
	}

	pub fn max_past_blocks(&self) -> u64 {
		self.max_past_blocks
	}

	/// Stored checkpoint, if any
	pub async fn checkpoint(&self) -> Result<Option<u64>, BlockWatcherError> {
		self.storage
			.get_last_processed_block(&self.network_slug)
			.await
	}

	/// Next range to process given the current chain head
	pub async fn next_range(
		&self,
		latest_block: u64,
	) -> Result<Option<BlockRange>, BlockWatcherError> {
		let checkpoint = self.checkpoint().await?;
		let range = plan_range(
			checkpoint,
			latest_block,
			self.confirmation_blocks,
			self.max_past_blocks,
		);

		if let Some(range) = range {
			let latest_confirmed = latest_block.saturating_sub(self.confirmation_blocks);
			let remaining = latest_confirmed - range.to;
			if remaining > self.max_past_blocks {
				tracing::warn!(
					network = %self.network_slug,
					lag = remaining,
					max_past_blocks = self.max_past_blocks,
					"Network is falling behind; {} confirmed blocks remain after this cycle",
					remaining
				);
			}
		}

		tracing::debug!(
			network = %self.network_slug,
			?checkpoint,
			latest_block,
			confirmation_blocks = self.confirmation_blocks,
			?range,
			"Planned block range"
		);

		Ok(range)
	}

	/// Advances the checkpoint to `block`.
	///
	/// A value below the stored checkpoint is ignored with a warning.
	pub async fn commit(&self, block: u64) -> Result<(), BlockWatcherError> {
		if let Some(current) = self.checkpoint().await? {
			if block < current {
				tracing::warn!(
					network = %self.network_slug,
					current,
					requested = block,
					"Refusing to move checkpoint backwards"
				);
				return Ok(());
			}
		}

		self.storage
			.save_last_processed_block(&self.network_slug, block)
			.await
			.map_err(|e| {
				BlockWatcherError::storage_error(
					format!("Failed to commit checkpoint {}", block),
					Some(Box::new(e)),
					Some(HashMap::from([
						("network".to_string(), self.network_slug.clone()),
						("block_number".to_string(), block.to_string()),
					])),
				)
			})
	}
}
